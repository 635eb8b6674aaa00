//! Email service for report notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::report::Report;

/// HTML template for the report notification email.
#[derive(Template)]
#[template(path = "email/report_received.html")]
struct ReportReceivedEmailHtml<'a> {
    report_id: i32,
    title: &'a str,
    report_type: &'a str,
    priority: &'a str,
    description: &'a str,
}

/// Plain text template for the report notification email.
#[derive(Template)]
#[template(path = "email/report_received.txt")]
struct ReportReceivedEmailText<'a> {
    report_id: i32,
    title: &'a str,
    report_type: &'a str,
    priority: &'a str,
    description: &'a str,
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

/// Email service for transactional notifications.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    reports_inbox: String,
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
            config.smtp_password.expose_secret().to_owned(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            reports_inbox: config.reports_inbox.clone(),
        })
    }

    /// Notify the reports inbox about a newly filed report.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_report_notification(&self, report: &Report) -> Result<(), EmailError> {
        let report_type = format!("{:?}", report.report_type);
        let priority = format!("{:?}", report.priority);

        let html = ReportReceivedEmailHtml {
            report_id: report.id.as_i32(),
            title: &report.title,
            report_type: &report_type,
            priority: &priority,
            description: &report.description,
        }
        .render()?;

        let text = ReportReceivedEmailText {
            report_id: report.id.as_i32(),
            title: &report.title,
            report_type: &report_type,
            priority: &priority,
            description: &report.description,
        }
        .render()?;

        let subject = format!("[Chirp] New report #{}: {}", report.id, report.title);
        self.send_multipart_email(&self.reports_inbox, &subject, &text, &html)
            .await
    }

    /// Send a multipart (text + HTML) email.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_owned()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_owned()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_owned()),
                    ),
            )?;

        self.mailer.send(message).await?;
        Ok(())
    }
}
