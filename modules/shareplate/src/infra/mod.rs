//! Infrastructure adapters: storage, mail, object storage.

pub mod mail;
pub mod object_store;
pub mod storage;
