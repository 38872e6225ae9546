//! Outbound email for one-time codes.

mod smtp;
mod templates;

pub use smtp::SmtpMailer;
pub use templates::OtpEmail;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::otp::OtpPurpose;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to send email: {0}")]
    SendFailed(String),

    #[error("invalid mail configuration: {0}")]
    InvalidConfig(String),
}

/// Delivers a plaintext code to a mailbox.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(
        &self,
        to: &str,
        code: &str,
        purpose: OtpPurpose,
        expires_in_minutes: i64,
    ) -> Result<(), MailError>;
}
