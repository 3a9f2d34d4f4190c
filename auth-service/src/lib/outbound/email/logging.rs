use async_trait::async_trait;
use auth::OtpCode;

use super::templates;
use crate::domain::principal::errors::EmailDeliveryError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::OtpPurpose;
use crate::domain::principal::ports::EmailSender;

/// Development sender: writes messages to the log instead of delivering them.
///
/// This is the only place a one-time code is ever logged.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        tracing::warn!("Email delivery disabled, OTP codes will be written to the log");
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_otp(
        &self,
        to: &EmailAddress,
        code: &OtpCode,
        purpose: OtpPurpose,
    ) -> Result<(), EmailDeliveryError> {
        tracing::info!(
            to = %to,
            subject = templates::otp_subject(purpose),
            purpose = purpose.as_str(),
            otp = %code,
            "Development mode: OTP email not sent"
        );
        Ok(())
    }

    async fn send_custom_email(
        &self,
        to: &EmailAddress,
        subject: &str,
        _html: &str,
    ) -> Result<(), EmailDeliveryError> {
        tracing::info!(to = %to, subject = %subject, "Development mode: email not sent");
        Ok(())
    }
}
