//! Image storage backends.

pub mod memory;
pub mod s3;

pub use memory::InMemoryImageStore;
pub use s3::S3ImageStore;
