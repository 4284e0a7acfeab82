//! API surfaces. REST is the only one.

pub mod rest;
