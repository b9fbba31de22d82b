use std::fmt::{self, Display};

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

use super::repository::{EmployerNotifier, JobNotification, NotificationError};
use crate::config::MailConfig;

pub const NOTIFICATION_SUBJECT: &str = "Job Notification Email";

/// HTML body sent to an employer when someone applies to one of their jobs.
pub struct JobNotificationEmail<'a> {
    pub notification: &'a JobNotification,
}

impl Display for JobNotificationEmail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let JobNotification {
            employer,
            applicant,
            job,
        } = self.notification;
        write!(
            f,
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{subject}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1>Hello {employer}</h1>
    <p>Job Title: {title}</p>
    <p>Employee Details:</p>
    <p>Name: {applicant}</p>
    <p>Email: {email}</p>
</body>
</html>
"#,
            subject = NOTIFICATION_SUBJECT,
            employer = escape_html(&employer.name),
            title = escape_html(&job.title),
            applicant = escape_html(&applicant.name),
            email = escape_html(&applicant.email),
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Builds the employer message without sending it.
pub fn build_message(
    from: &Mailbox,
    notification: &JobNotification,
) -> Result<Message, NotificationError> {
    let address = notification
        .employer
        .email
        .parse::<Address>()
        .map_err(|err| NotificationError::Message(format!("employer address: {err}")))?;
    let to = Mailbox::new(Some(notification.employer.name.clone()), address);

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(NOTIFICATION_SUBJECT)
        .header(ContentType::TEXT_HTML)
        .body(JobNotificationEmail { notification }.to_string())
        .map_err(|err| NotificationError::Message(err.to_string()))
}

/// Sends over an SMTP relay. The blocking transport runs on the blocking pool and the request
/// waits for it, so transport failures reach the caller.
#[derive(Clone)]
pub struct SmtpMailer {
    from: Mailbox,
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(from: Mailbox, transport: SmtpTransport) -> Self {
        Self { from, transport }
    }
}

/// Employer notifier selected from configuration.
#[derive(Clone)]
pub enum EmployerMailer {
    Smtp(SmtpMailer),
    /// Logs the rendered message instead of sending it.
    Log { from: Mailbox },
}

impl EmployerMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, NotificationError> {
        let address = config
            .from_address
            .parse::<Address>()
            .map_err(|err| NotificationError::Message(format!("sender address: {err}")))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let Some(smtp) = &config.smtp else {
            return Ok(Self::Log { from });
        };

        let mut builder = SmtpTransport::relay(&smtp.host)
            .map_err(|err| NotificationError::Transport(err.to_string()))?
            .port(smtp.port);
        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self::Smtp(SmtpMailer::new(from, builder.build())))
    }
}

#[async_trait]
impl EmployerNotifier for EmployerMailer {
    async fn notify_employer(
        &self,
        notification: JobNotification,
    ) -> Result<(), NotificationError> {
        match self {
            Self::Smtp(mailer) => {
                let message = build_message(&mailer.from, &notification)?;
                let transport = mailer.transport.clone();
                tokio::task::spawn_blocking(move || transport.send(&message))
                    .await
                    .map_err(|err| NotificationError::Transport(err.to_string()))?
                    .map_err(|err| NotificationError::Transport(err.to_string()))?;
                tracing::info!(
                    employer = %notification.employer.id,
                    job = %notification.job.id,
                    "employer notification sent"
                );
                Ok(())
            }
            Self::Log { from } => {
                let message = build_message(from, &notification)?;
                tracing::info!(
                    employer = %notification.employer.id,
                    to = %notification.employer.email,
                    job = %notification.job.id,
                    bytes = message.formatted().len(),
                    "smtp not configured, employer notification logged"
                );
                Ok(())
            }
        }
    }
}
