// Email Service Module
// Booking notifications: builders render, the sender delivers

pub mod builders;
pub mod sender;
pub mod types;

use async_trait::async_trait;
use builders::{GuestBookingEmailBuilder, HostNewBookingEmailBuilder, BOOKING_TEMPLATE};
use handlebars::Handlebars;
use sender::EmailSender;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::app_config::{AppConfig, EmailConfig};

pub use types::{BookingNotice, EmailError, EmailMessage, HostContact, NotificationKind};
use types::EmailBuilder;

/// Side-effect fired after a booking changes state
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn notify(&self, kind: NotificationKind, notice: &BookingNotice) -> Result<(), EmailError>;
}

#[derive(Clone)]
pub struct EmailService {
    sender: Option<EmailSender>,
    config: EmailConfig,
    client_url: String,
    templates: Arc<Handlebars<'static>>,
}

impl EmailService {
    pub fn new(config: &AppConfig) -> Result<Self, EmailError> {
        let mut templates = Handlebars::new();
        Self::register_templates(&mut templates)?;

        let sender = EmailSender::from_config(&config.email)?;
        if sender.is_none() {
            info!("EMAIL_API_KEY not set, booking emails are disabled");
        }

        Ok(Self {
            sender,
            config: config.email.clone(),
            client_url: config.client_url.clone(),
            templates: Arc::new(templates),
        })
    }

    fn register_templates(templates: &mut Handlebars) -> Result<(), EmailError> {
        let booking_template = include_str!("../../templates/email/booking_notification.html");
        templates
            .register_template_string(BOOKING_TEMPLATE, booking_template)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Render every message a notification produces: the guest always, the host for `new`
    pub fn compose(
        &self,
        kind: NotificationKind,
        notice: &BookingNotice,
    ) -> Result<Vec<EmailMessage>, EmailError> {
        let mut messages = Vec::with_capacity(2);

        if kind == NotificationKind::New && !notice.host.email.is_empty() {
            messages.push(
                HostNewBookingEmailBuilder::new(
                    notice,
                    &self.client_url,
                    &self.config,
                    &self.templates,
                )
                .build()?,
            );
        }

        messages.push(
            GuestBookingEmailBuilder::new(
                kind,
                notice,
                &self.client_url,
                &self.config,
                &self.templates,
            )
            .build()?,
        );

        Ok(messages)
    }
}

#[async_trait]
impl BookingNotifier for EmailService {
    #[instrument(skip(self, notice), fields(booking_id = %notice.booking.id))]
    async fn notify(&self, kind: NotificationKind, notice: &BookingNotice) -> Result<(), EmailError> {
        let Some(sender) = &self.sender else {
            info!(?kind, "Email disabled, skipping booking notification");
            return Ok(());
        };

        let mut first_error = None;
        for message in self.compose(kind, notice)? {
            // One failed recipient must not stop the other
            if let Err(e) = sender.send(message).await {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
