//! SMTP mail delivery via lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::domain::ports::MailSender;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)?;
        if cfg.smtp_port != 0 {
            builder = builder.port(cfg.smtp_port);
        }
        if !cfg.username.is_empty() {
            builder =
                builder.credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: cfg.from.clone(),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send_reset_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject("Your SharePlate password reset code")
            .header(ContentType::TEXT_HTML)
            .body(render_reset_email(code))?;

        self.transport.send(message).await?;
        tracing::debug!(to, "password reset mail sent");
        Ok(())
    }
}

fn render_reset_email(code: &str) -> String {
    format!(
        "<p>Hello,</p>\
         <p>Your SharePlate password reset code is:</p>\
         <p style=\"font-size: 24px; font-weight: bold;\">{code}</p>\
         <p>The code is valid for 10 minutes. If you did not request a \
         reset, you can ignore this email.</p>"
    )
}

#[cfg(test)]
mod tests {
    use super::render_reset_email;

    #[test]
    fn reset_email_contains_the_code() {
        let body = render_reset_email("123456");
        assert!(body.contains("123456"));
        assert!(body.contains("10 minutes"));
    }
}
