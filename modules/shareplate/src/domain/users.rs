//! User directory: registration, login, password reset, deactivation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::security::password;

use super::error::DomainError;
use super::model::{NewUser, OtpRecord, User};
use super::ports::MailSender;
use super::repo::{OtpRepository, UserRepository};

pub struct UserDirectory {
    users: Arc<dyn UserRepository>,
    otps: Arc<dyn OtpRepository>,
    mailer: Arc<dyn MailSender>,
    otp_ttl: Duration,
}

impl UserDirectory {
    pub fn new(
        users: Arc<dyn UserRepository>,
        otps: Arc<dyn OtpRepository>,
        mailer: Arc<dyn MailSender>,
        otp_ttl_minutes: i64,
    ) -> Self {
        Self {
            users,
            otps,
            mailer,
            otp_ttl: Duration::minutes(otp_ttl_minutes),
        }
    }

    /// Register a new account. The email must be free and every profile
    /// field non-empty; the password is hashed before storage.
    pub async fn register(&self, new: NewUser) -> Result<User, DomainError> {
        require_field("email", &new.email)?;
        require_field("password", &new.password)?;
        require_field("name", &new.name)?;
        require_field("phone", &new.phone)?;
        require_field("address", &new.address)?;

        if self.users.find_by_email(&new.email).await?.is_some() {
            return Err(DomainError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: password::hash(&new.password)?,
            role: new.role,
            name: new.name,
            phone: new.phone,
            address: new.address,
            is_active: true,
            created_at: Utc::now(),
        };

        let user = self.users.insert(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Verify credentials. Unknown email and wrong password both surface as
    /// `InvalidCredentials`.
    pub async fn login(&self, email: &str, pass: &str) -> Result<User, DomainError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(DomainError::InvalidCredentials);
        };
        if !password::verify(&user.password_hash, pass)? {
            return Err(DomainError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Issue a one-time reset code and email it. The code is persisted
    /// before the mail leaves so a delivered code always validates.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), DomainError> {
        if self.users.find_by_email(email).await?.is_none() {
            return Err(DomainError::UserNotFound);
        }

        let code = generate_code();
        let now = Utc::now();
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            code: code.clone(),
            expires_at: now + self.otp_ttl,
            created_at: now,
        };
        self.otps.insert(record).await?;

        self.mailer
            .send_reset_code(email, &code)
            .await
            .map_err(DomainError::MailDelivery)?;
        tracing::info!(email, "password reset code issued");
        Ok(())
    }

    /// Validate and consume a reset code. The record is consumed on every
    /// terminal outcome, so an expired code also cannot be replayed.
    pub async fn validate_otp(&self, email: &str, code: &str) -> Result<(), DomainError> {
        let Some(record) = self.otps.find_by_email_and_code(email, code).await? else {
            return Err(DomainError::OtpInvalid);
        };
        self.otps.delete(record.id).await?;
        if record.expires_at < Utc::now() {
            return Err(DomainError::OtpExpired);
        }
        Ok(())
    }

    pub async fn reset_password(&self, email: &str, new_password: &str) -> Result<(), DomainError> {
        require_field("newPassword", new_password)?;
        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(DomainError::UserNotFound);
        };
        let hash = password::hash(new_password)?;
        self.users.set_password_hash(user.id, hash).await?;
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Soft-deactivate an account. The record is kept.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.users.set_active(id, false).await? {
            return Err(DomainError::UserNotFound);
        }
        tracing::info!(user_id = %id, "user deactivated");
        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.list_all().await?)
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.users.count().await?)
    }
}

fn require_field(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    Ok(())
}

/// Six-digit numeric reset code.
fn generate_code() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::generate_code;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
