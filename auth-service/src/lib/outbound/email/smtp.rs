use std::time::Duration;

use async_trait::async_trait;
use auth::OtpCode;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::message::MultiPart;
use lettre::message::SinglePart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::Message;
use lettre::SmtpTransport;
use lettre::Transport;

use super::templates;
use crate::config::EmailConfig;
use crate::domain::principal::errors::EmailDeliveryError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::OtpPurpose;
use crate::domain::principal::ports::EmailSender;

/// SMTP delivery through a pooled relay connection.
#[derive(Clone)]
pub struct SmtpEmailSender {
    mailer: SmtpTransport,
    from: Mailbox,
    otp_ttl_minutes: i64,
}

impl SmtpEmailSender {
    /// # Errors
    /// * `InvalidMessage` - Sender address does not parse
    /// * `SendFailed` - Relay could not be configured
    pub fn new(config: &EmailConfig, otp_ttl_minutes: i64) -> Result<Self, EmailDeliveryError> {
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| EmailDeliveryError::InvalidMessage(e.to_string()))?;

        let mailer = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| EmailDeliveryError::SendFailed(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            "Email sender initialized with SMTP relay"
        );

        Ok(Self {
            mailer,
            from,
            otp_ttl_minutes,
        })
    }

    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        plain: Option<String>,
        html: String,
    ) -> Result<(), EmailDeliveryError> {
        let recipient = to
            .as_str()
            .parse::<Mailbox>()
            .map_err(|e| EmailDeliveryError::InvalidMessage(e.to_string()))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject);

        let html_part = SinglePart::builder().header(ContentType::TEXT_HTML).body(html);
        let message = match plain {
            Some(plain) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(plain))
                    .singlepart(html_part),
            ),
            None => builder.singlepart(html_part),
        }
        .map_err(|e| EmailDeliveryError::InvalidMessage(e.to_string()))?;

        // SmtpTransport blocks; keep it off the async workers.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| EmailDeliveryError::SendFailed(e.to_string()))?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to, subject = %subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, to = %to, "Failed to send email");
                Err(EmailDeliveryError::SendFailed(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_otp(
        &self,
        to: &EmailAddress,
        code: &OtpCode,
        purpose: OtpPurpose,
    ) -> Result<(), EmailDeliveryError> {
        let email = templates::render_otp(code, purpose, self.otp_ttl_minutes);
        self.send(to, email.subject, Some(email.plain), email.html).await
    }

    async fn send_custom_email(
        &self,
        to: &EmailAddress,
        subject: &str,
        html: &str,
    ) -> Result<(), EmailDeliveryError> {
        self.send(to, subject, None, html.to_string()).await
    }
}
