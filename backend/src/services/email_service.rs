//! Outbound email delivery for registration confirmation links.
//!
//! The `Mailer` trait is the seam between the auth use-cases and the actual
//! transport; `SmtpMailer` is the lettre-backed production implementation.

use crate::config::EmailConfig;
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;

/// Payload for a registration/confirmation email.
#[derive(Debug, Clone)]
pub struct RegistrationEmail {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// External collaborator that delivers confirmation emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the registration email carrying the confirmation token link.
    async fn send_registration_email(
        &self,
        payload: &RegistrationEmail,
        confirmation_token: &str,
    ) -> ServiceResult<()>;
}

/// SMTP-backed mailer using lettre's async transport.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl SmtpMailer {
    /// Creates a new SmtpMailer instance
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::external_service(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> ServiceResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::external_service(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(to_email)
            .map_err(|e| ServiceError::external_service(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| ServiceError::external_service(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ServiceError::external_service(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    fn build_confirmation_html(&self, recipient_name: &str, verify_url: &str) -> String {
        format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <title>Confirm your email for {}</title>
            </head>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2c3e50;">Confirm your email</h2>

                    <p>Hi {},</p>

                    <p>Thanks for signing up for <strong>{}</strong>. Click the button
                    below to verify your email address:</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{}"
                           style="background-color: #3498db; color: white; padding: 12px 30px;
                                  text-decoration: none; border-radius: 5px; display: inline-block;">
                            Verify Email
                        </a>
                    </div>

                    <p>Or copy and paste this link into your browser:</p>
                    <p style="word-break: break-all; color: #7f8c8d;">{}</p>

                    <hr style="border: none; border-top: 1px solid #ecf0f1; margin: 30px 0;">

                    <p style="font-size: 12px; color: #7f8c8d;">
                        If you didn't create an account, you can safely ignore this email.
                    </p>
                </div>
            </body>
            </html>
            "#,
            self.config.service_name,
            recipient_name,
            self.config.service_name,
            verify_url,
            verify_url
        )
    }

    fn build_confirmation_text(&self, recipient_name: &str, verify_url: &str) -> String {
        format!(
            r#"Confirm your email

Hi {},

Thanks for signing up for {}. Open the link below to verify your email address:
{}

If you didn't create an account, you can safely ignore this email.
            "#,
            recipient_name, self.config.service_name, verify_url
        )
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_registration_email(
        &self,
        payload: &RegistrationEmail,
        confirmation_token: &str,
    ) -> ServiceResult<()> {
        let subject = "Email confirmation";
        let verify_url = format!(
            "{}/api/auth/verify/{}",
            self.config.base_url, confirmation_token
        );

        let recipient_name = payload.first_name.as_deref().unwrap_or("there");

        let html_content = self.build_confirmation_html(recipient_name, &verify_url);
        let text_content = self.build_confirmation_text(recipient_name, &verify_url);

        self.send_email(&payload.email, subject, &html_content, &text_content)
            .await
    }
}
