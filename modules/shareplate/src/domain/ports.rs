//! Collaborator ports: services the domain consumes but does not implement.

use async_trait::async_trait;

/// Outbound mail. One message kind is enough for this service; no retries
/// are performed on failure.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()>;
}

/// Object storage with public-URL retrieval. Returns the public URL of the
/// stored object.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store_jpeg(&self, key: &str, bytes: Vec<u8>) -> anyhow::Result<String>;
}
