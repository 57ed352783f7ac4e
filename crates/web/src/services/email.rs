//! Email delivery for password resets and post-change notifications.
//!
//! Uses SMTP via lettre with Askama templates for both HTML and plain
//! text bodies.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/reset_password.html")]
struct ResetPasswordEmailHtml<'a> {
    label: &'a str,
    reset_url: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/reset_password.txt")]
struct ResetPasswordEmailText<'a> {
    label: &'a str,
    reset_url: &'a str,
}

/// HTML template for the post change notification.
#[derive(Template)]
#[template(path = "email/post_changed.html")]
struct PostChangedEmailHtml<'a> {
    post_key: &'a str,
    editor: &'a str,
    edit_url: &'a str,
}

/// Plain text template for the post change notification.
#[derive(Template)]
#[template(path = "email/post_changed.txt")]
struct PostChangedEmailText<'a> {
    post_key: &'a str,
    editor: &'a str,
    edit_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for transactional mail from the admin panel.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a password reset email with the change-password link.
    ///
    /// The label lets the recipient match the mail to the request they
    /// see on screen.
    ///
    /// # Errors
    ///
    /// Returns error if the mail fails to render or send.
    pub async fn send_password_reset(
        &self,
        to: &str,
        label: &str,
        reset_url: &str,
    ) -> Result<(), EmailError> {
        let html = ResetPasswordEmailHtml { label, reset_url }.render()?;
        let text = ResetPasswordEmailText { label, reset_url }.render()?;

        self.send_multipart_email(to, &format!("Password reset {label}"), &text, &html)
            .await
    }

    /// Notify the site owner that a post was changed in the admin panel.
    ///
    /// # Errors
    ///
    /// Returns error if the mail fails to render or send.
    pub async fn send_post_change_notification(
        &self,
        to: &str,
        post_key: &str,
        editor: &str,
        edit_url: &str,
    ) -> Result<(), EmailError> {
        let html = PostChangedEmailHtml {
            post_key,
            editor,
            edit_url,
        }
        .render()?;
        let text = PostChangedEmailText {
            post_key,
            editor,
            edit_url,
        }
        .render()?;

        self.send_multipart_email(to, &format!("Post changed: {post_key}"), &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let from: Mailbox = format!("Kavka automat <{}>", self.from_address)
            .parse()
            .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?;

        let email = Message::builder()
            .from(from)
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
