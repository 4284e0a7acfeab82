//! Console mail backend: logs instead of sending. Used for local and mock
//! runs where no SMTP relay is configured.

use async_trait::async_trait;

use crate::domain::ports::MailSender;

#[derive(Default)]
pub struct ConsoleMailer;

#[async_trait]
impl MailSender for ConsoleMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        tracing::info!(to, code, "password reset code (console mailer)");
        Ok(())
    }
}
