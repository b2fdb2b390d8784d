// Email Builders - turn a booking notice into a rendered message
// One builder per recipient; both share the `booking_notification` template

use super::types::{
    BookingEmailData, BookingNotice, EmailBuilder, EmailError, EmailMessage, InfoRow,
    NotificationKind,
};
use crate::{app_config::EmailConfig, models::event::LocationType};
use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use tracing::instrument;

pub const BOOKING_TEMPLATE: &str = "booking_notification";

const GOOGLE_CALENDAR_URL: &str = "https://calendar.google.com/calendar/render";

// =============================================================================
// FORMATTING HELPERS
// =============================================================================

/// `2024년 03월 04일 10:00 (UTC)`
pub fn format_booking_time(at: DateTime<Utc>) -> String {
    at.format("%Y년 %m월 %d일 %H:%M (UTC)").to_string()
}

pub fn location_text(location_type: LocationType, details: Option<&str>) -> String {
    let base = match location_type {
        LocationType::Online => "온라인",
        LocationType::Phone => "전화",
        LocationType::InPerson => "직접 방문",
    };

    match details {
        Some(details) if !details.is_empty() => format!("{} - {}", base, details),
        _ => base.to_string(),
    }
}

/// Google Calendar "add event" link for a booked slot
pub fn google_calendar_link(notice: &BookingNotice) -> String {
    let booking = &notice.booking;
    let event = &notice.event;

    let dates = format!(
        "{}/{}",
        booking.scheduled_at.format("%Y%m%dT%H%M%SZ"),
        booking.end_at.format("%Y%m%dT%H%M%SZ")
    );
    let details = format!(
        "{}\n\n게스트: {}\n이메일: {}",
        event.description.as_deref().unwrap_or_default(),
        booking.guest_name,
        booking.guest_email
    );
    let location = location_text(event.location_type, event.location_details.as_deref());

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("action", "TEMPLATE")
        .append_pair("text", &event.title)
        .append_pair("dates", &dates)
        .append_pair("details", &details)
        .append_pair("location", &location)
        .finish();

    format!("{}?{}", GOOGLE_CALENDAR_URL, query)
}

fn render(templates: &Handlebars<'_>, data: &BookingEmailData) -> Result<String, EmailError> {
    templates
        .render(BOOKING_TEMPLATE, data)
        .map_err(|e| EmailError::TemplateError(e.to_string()))
}

fn plain_text(data: &BookingEmailData) -> String {
    let mut text = format!("{}\n\n{}\n\n", data.heading, data.intro);
    for row in &data.rows {
        text.push_str(&format!("{}: {}\n", row.label, row.value));
    }
    if let Some(closing) = &data.closing {
        text.push_str(&format!("\n{}\n", closing));
    }
    if let Some(url) = &data.action_url {
        text.push_str(&format!("\n{}\n", url));
    }
    text
}

fn sender_address(config: &EmailConfig) -> String {
    format!("{} <{}>", config.from_name, config.from_email)
}

// =============================================================================
// GUEST EMAIL
// =============================================================================

/// Email to the guest; sent for every lifecycle step
pub struct GuestBookingEmailBuilder<'a> {
    kind: NotificationKind,
    notice: &'a BookingNotice,
    client_url: &'a str,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> GuestBookingEmailBuilder<'a> {
    pub fn new(
        kind: NotificationKind,
        notice: &'a BookingNotice,
        client_url: &'a str,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            kind,
            notice,
            client_url,
            config,
            templates,
        }
    }

    pub fn data(&self) -> BookingEmailData {
        let booking = &self.notice.booking;
        let event = &self.notice.event;
        let host_name = if self.notice.host.name.trim().is_empty() {
            "호스트".to_string()
        } else {
            self.notice.host.name.clone()
        };
        let when = format_booking_time(booking.scheduled_at);
        let duration = format!("{}분", event.duration);
        let location = location_text(event.location_type, event.location_details.as_deref());

        let mut data = BookingEmailData {
            badge: self.kind.badge(),
            color: self.kind.color(),
            heading: String::new(),
            intro: String::new(),
            rows: Vec::new(),
            closing: None,
            action_url: None,
            action_label: None,
            client_url: self.client_url.to_string(),
        };

        match self.kind {
            NotificationKind::New => {
                data.heading = "예약 신청이 완료되었습니다!".to_string();
                data.intro = format!(
                    "{}님의 예약 신청이 성공적으로 접수되었습니다. 호스트의 확인 후 확정 또는 거절 알림을 받으실 수 있습니다.",
                    booking.guest_name
                );
                data.rows = vec![
                    InfoRow::new("이벤트", event.title.clone()),
                    InfoRow::new("호스트", host_name),
                    InfoRow::new("요청 시간", when),
                    InfoRow::new("소요 시간", duration),
                    InfoRow::new("장소", location),
                ];
                if let Some(notes) = &booking.notes {
                    data.rows.push(InfoRow::new("메모", notes.clone()));
                }
                data.closing = Some(
                    "호스트의 확인을 기다려주세요. 확정되면 캘린더에 추가할 수 있는 링크를 보내드립니다."
                        .to_string(),
                );
            },
            NotificationKind::Confirmed => {
                data.heading = "예약이 확정되었습니다!".to_string();
                data.intro = format!(
                    "{}님의 예약이 확정되었습니다. 아래 정보를 확인하고 예약 시간에 맞춰 참석해주세요.",
                    booking.guest_name
                );
                data.rows = vec![
                    InfoRow::new("이벤트", event.title.clone()),
                    InfoRow::new("호스트", host_name),
                    InfoRow::new("예약 시간", when),
                    InfoRow::new("소요 시간", duration),
                    InfoRow::new("장소", location),
                ];
                data.action_url = Some(google_calendar_link(self.notice));
                data.action_label = Some("📅 캘린더에 추가");
            },
            NotificationKind::Declined => {
                data.heading = "예약이 거절되었습니다".to_string();
                data.intro = format!(
                    "{}님의 예약 요청이 거절되었습니다. 다른 시간에 다시 예약해주세요.",
                    booking.guest_name
                );
                data.rows = vec![
                    InfoRow::new("이벤트", event.title.clone()),
                    InfoRow::new("호스트", host_name),
                    InfoRow::new("요청 시간", when),
                ];
                if let Some(reason) = &booking.cancellation_reason {
                    data.rows.push(InfoRow::new("거절 사유", reason.clone()));
                }
                data.closing = Some("다른 시간에 다시 예약해주세요. 감사합니다.".to_string());
            },
            NotificationKind::Cancelled => {
                data.heading = "예약이 취소되었습니다".to_string();
                data.intro = format!("{}님의 예약이 취소되었습니다.", booking.guest_name);
                data.rows = vec![
                    InfoRow::new("이벤트", event.title.clone()),
                    InfoRow::new("예약 시간", when),
                ];
                data.closing = Some("예약이 취소되었습니다. 감사합니다.".to_string());
            },
        }

        data
    }
}

impl<'a> EmailBuilder for GuestBookingEmailBuilder<'a> {
    #[instrument(skip(self), fields(kind = ?self.kind, booking_id = %self.notice.booking.id))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = self.data();
        let html = render(self.templates, &data)?;

        let mut message = EmailMessage::new(
            sender_address(self.config),
            vec![self.notice.booking.guest_email.clone()],
            self.kind.guest_subject(&self.notice.event.title),
            html,
        )
        .with_text(plain_text(&data));

        if !self.notice.host.email.is_empty() {
            message = message.with_reply_to(self.notice.host.email.clone());
        }

        Ok(message)
    }
}

// =============================================================================
// HOST EMAIL
// =============================================================================

/// Email to the host announcing a new request
pub struct HostNewBookingEmailBuilder<'a> {
    notice: &'a BookingNotice,
    client_url: &'a str,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> HostNewBookingEmailBuilder<'a> {
    pub fn new(
        notice: &'a BookingNotice,
        client_url: &'a str,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            notice,
            client_url,
            config,
            templates,
        }
    }

    pub fn data(&self) -> BookingEmailData {
        let booking = &self.notice.booking;
        let event = &self.notice.event;
        let kind = NotificationKind::New;

        let mut rows = vec![
            InfoRow::new("이벤트", event.title.clone()),
            InfoRow::new("게스트", booking.guest_name.clone()),
            InfoRow::new("이메일", booking.guest_email.clone()),
            InfoRow::new("요청 시간", format_booking_time(booking.scheduled_at)),
            InfoRow::new("소요 시간", format!("{}분", event.duration)),
            InfoRow::new(
                "장소",
                location_text(event.location_type, event.location_details.as_deref()),
            ),
        ];
        if let Some(notes) = &booking.notes {
            rows.push(InfoRow::new("메모", notes.clone()));
        }

        BookingEmailData {
            badge: kind.badge(),
            color: kind.color(),
            heading: "새로운 예약 신청이 도착했습니다!".to_string(),
            intro: "새로운 예약 신청이 접수되었습니다. 아래 정보를 확인하고 확정 또는 거절해주세요."
                .to_string(),
            rows,
            closing: Some("예약을 확인하고 확정 또는 거절해주세요.".to_string()),
            action_url: Some(format!("{}/bookings", self.client_url)),
            action_label: Some("📋 예약 관리하기"),
            client_url: self.client_url.to_string(),
        }
    }
}

impl<'a> EmailBuilder for HostNewBookingEmailBuilder<'a> {
    #[instrument(skip(self), fields(booking_id = %self.notice.booking.id))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = self.data();
        let html = render(self.templates, &data)?;
        let subject = NotificationKind::New
            .host_subject(&self.notice.event.title)
            .unwrap_or_default();

        Ok(EmailMessage::new(
            sender_address(self.config),
            vec![self.notice.host.email.clone()],
            subject,
            html,
        )
        .with_text(plain_text(&data))
        .with_reply_to(self.notice.booking.guest_email.clone()))
    }
}
