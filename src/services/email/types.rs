// Email Service Types - Shared types and structures for the email module

use serde::Serialize;
use thiserror::Error;

use crate::models::{booking::Booking, event::Event};

/// Errors that can occur during email operations
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendError(String),

    #[error("Template rendering error: {0}")]
    TemplateError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Generic email message structure that can be sent
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub reply_to: Option<String>,
}

impl EmailMessage {
    pub fn new(from: String, to: Vec<String>, subject: String, html: String) -> Self {
        Self {
            from,
            to,
            subject,
            html,
            text: None,
            reply_to: None,
        }
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }
}

/// Trait that all email builders must implement
pub trait EmailBuilder {
    fn build(&self) -> Result<EmailMessage, EmailError>;
}

/// Which booking lifecycle step an email announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    New,
    Confirmed,
    Declined,
    Cancelled,
}

impl NotificationKind {
    /// Accent colour of the badge and summary card
    pub fn color(&self) -> &'static str {
        match self {
            NotificationKind::New => "#1890ff",
            NotificationKind::Confirmed => "#52c41a",
            NotificationKind::Declined => "#ff4d4f",
            NotificationKind::Cancelled => "#faad14",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            NotificationKind::New => "예약 신청",
            NotificationKind::Confirmed => "예약 확정",
            NotificationKind::Declined => "예약 거절",
            NotificationKind::Cancelled => "예약 취소",
        }
    }

    pub fn guest_subject(&self, event_title: &str) -> String {
        let headline = match self {
            NotificationKind::New => "새로운 예약 요청",
            NotificationKind::Confirmed => "예약이 확정되었습니다",
            NotificationKind::Declined => "예약이 거절되었습니다",
            NotificationKind::Cancelled => "예약이 취소되었습니다",
        };
        format!("[MOYAK] {}: {}", headline, event_title)
    }

    /// Hosts only hear about new requests
    pub fn host_subject(&self, event_title: &str) -> Option<String> {
        match self {
            NotificationKind::New => Some(format!("[MOYAK] 새로운 예약 요청이 있습니다: {}", event_title)),
            _ => None,
        }
    }
}

/// Contact details of the event owner
#[derive(Debug, Clone)]
pub struct HostContact {
    pub name: String,
    pub email: String,
}

/// Everything a booking email needs to render
#[derive(Debug, Clone)]
pub struct BookingNotice {
    pub booking: Booking,
    pub event: Event,
    pub host: HostContact,
}

/// One labelled line in the booking summary card
#[derive(Debug, Clone, Serialize)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

impl InfoRow {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Data for `booking_guest.html` and `booking_host.html`
#[derive(Debug, Clone, Serialize)]
pub struct BookingEmailData {
    pub badge: &'static str,
    pub color: &'static str,
    pub heading: String,
    pub intro: String,
    pub rows: Vec<InfoRow>,
    pub closing: Option<String>,
    pub action_url: Option<String>,
    pub action_label: Option<&'static str>,
    pub client_url: String,
}

/// Payload accepted by the HTTP email API
///
/// Optional fields are omitted from the JSON body when `None`.
#[derive(Debug, Serialize)]
pub struct EmailPayload {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl From<EmailMessage> for EmailPayload {
    fn from(message: EmailMessage) -> Self {
        Self {
            from: message.from,
            to: message.to,
            subject: message.subject,
            html: message.html,
            text: message.text,
            reply_to: message.reply_to,
        }
    }
}
