use std::str::FromStr;

use lettre::{
    Address, Message, SmtpTransport, Transport,
    message::{Attachment as MessageAttachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::debug;

use crate::bundle::AttachmentSet;

use super::{MailError, Mailer, NotificationMessage};

/// SMTP mailer backed by lettre.
///
/// Env contract for [`SmtpSettings::from_env`] (read once, up front):
/// - host: `SMTP_HOST` required
/// - port: `SMTP_PORT` (default `587`)
/// - user/pass: `SMTP_USERNAME` / `SMTP_PASSWORD`, both or neither
/// - secure: `SMTP_SECURE` (`true/false`, default `true`)
/// - sender display name: `EMAIL_FROM_NAME` optional
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    settings: SmtpSettings,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub secure: bool,
    pub from_name: Option<String>,
}

fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        std::env::var(k)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl SmtpSettings {
    pub fn from_env() -> Result<Self, MailError> {
        let host = env_first(&["SMTP_HOST"])
            .ok_or_else(|| MailError("missing SMTP host env var (SMTP_HOST)".into()))?;
        let port = env_first(&["SMTP_PORT"])
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(587);
        let username = env_first(&["SMTP_USERNAME"]);
        let password = env_first(&["SMTP_PASSWORD"]);
        if username.is_some() ^ password.is_some() {
            return Err(MailError(
                "set both SMTP_USERNAME and SMTP_PASSWORD or neither".into(),
            ));
        }
        let secure = env_first(&["SMTP_SECURE"])
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(true);
        let from_name = env_first(&["EMAIL_FROM_NAME"]);
        Ok(Self {
            host,
            port,
            username,
            password,
            secure,
            from_name,
        })
    }
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    pub fn from_env() -> Result<Self, MailError> {
        Ok(Self::new(SmtpSettings::from_env()?))
    }
}

fn mailbox(email: &str, name: Option<&str>) -> Result<Mailbox, MailError> {
    let address = Address::from_str(email)
        .map_err(|e| MailError(format!("invalid email address {email}: {e}")))?;
    Ok(Mailbox::new(name.map(String::from), address))
}

fn build_transport(settings: &SmtpSettings) -> Result<SmtpTransport, MailError> {
    let mut transport = if settings.secure {
        SmtpTransport::relay(&settings.host).map_err(|e| MailError(e.to_string()))?
    } else {
        SmtpTransport::builder_dangerous(&settings.host)
    };
    transport = transport.port(settings.port);
    if let (Some(username), Some(password)) = (settings.username.clone(), settings.password.clone())
    {
        transport = transport.credentials(Credentials::new(username, password));
    }
    Ok(transport.build())
}

impl Mailer for SmtpMailer {
    fn send(
        &self,
        message: &NotificationMessage,
        attachments: &AttachmentSet,
    ) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(mailbox(&message.from, self.settings.from_name.as_deref())?)
            .to(mailbox(&message.to, None)?)
            .subject(message.subject.clone());
        for cc in &message.cc {
            builder = builder.cc(mailbox(cc, None)?);
        }

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(message.body.clone()));
        for attachment in attachments.iter() {
            let content_type = ContentType::parse(&attachment.media_type).map_err(|e| {
                MailError(format!("invalid media type {}: {}", attachment.media_type, e))
            })?;
            multipart = multipart.singlepart(
                MessageAttachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type),
            );
        }

        let email: Message = builder
            .multipart(multipart)
            .map_err(|e| MailError(e.to_string()))?;

        let transport = build_transport(&self.settings)?;

        debug!(
            event = "email.send_attempt",
            domain = "expense",
            host = self.settings.host.as_str(),
            attachments = attachments.len(),
            subject_len = message.subject.len() as u64
        );
        transport.send(&email).map_err(|e| MailError(e.to_string()))?;
        Ok(())
    }
}
