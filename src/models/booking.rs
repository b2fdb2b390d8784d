// Booking Database Model
// A guest's request for a concrete time slot against an event

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::event::LocationType,
    schema::{bookings, events},
};

// =============================================================================
// STATUS LIFECYCLE
// =============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Declined,
    Cancelled,
}

impl BookingStatus {
    /// Statuses that hold their time slot
    pub const BLOCKING: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Declined => "declined",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Allowed moves: pending -> confirmed | declined | cancelled, confirmed -> cancelled
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Declined)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "declined" => Ok(BookingStatus::Declined),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for BookingStatus
where
    DB: diesel::backend::Backend,
    String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
        let value = String::from_sql(bytes)?;
        Self::from_str(&value).map_err(|e| e.into())
    }
}

impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for BookingStatus
where
    DB: diesel::backend::Backend,
    str: diesel::serialize::ToSql<diesel::sql_types::Text, DB>,
{
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, DB>,
    ) -> diesel::serialize::Result {
        self.as_str().to_sql(out)
    }
}

// =============================================================================
// TIME SLOT ARITHMETIC
// =============================================================================

/// End of a booking that starts at `scheduled_at` and lasts `duration_minutes`
pub fn compute_end_at(scheduled_at: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    scheduled_at + Duration::minutes(i64::from(duration_minutes))
}

// =============================================================================
// DATABASE MODELS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Host who owns the event
    pub user_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub timezone: String,
    pub calendar_event_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub timezone: String,
}

/// Status change written by the host actions
#[derive(Debug, AsChangeset)]
#[diesel(table_name = bookings)]
#[diesel(treat_none_as_null = true)]
pub struct BookingStatusChange {
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of the parent event shown next to each booking
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, ToSchema)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventSummary {
    pub title: String,
    pub duration: i32,
    pub location_type: LocationType,
    pub location_details: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingWithEvent {
    #[serde(flatten)]
    pub booking: Booking,
    pub event: EventSummary,
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "event_id": "3f0b5b4e-9a55-4c59-a2a4-6c2e1c0b8f11",
    "guest_name": "홍길동",
    "guest_email": "guest@example.com",
    "scheduled_at": "2024-03-04T01:00:00Z",
    "notes": "Looking forward to it"
}))]
pub struct CreateBookingRequest {
    pub event_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Guest name is required"))]
    pub guest_name: String,

    #[validate(email(message = "A valid guest email is required"))]
    #[validate(length(max = 255, message = "Email must be less than 255 characters"))]
    pub guest_email: String,

    #[validate(length(max = 50, message = "Phone number must be less than 50 characters"))]
    pub guest_phone: Option<String>,

    /// ISO 8601 start of the requested slot
    pub scheduled_at: DateTime<Utc>,

    #[validate(length(max = 5000, message = "Notes must be less than 5000 characters"))]
    pub notes: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Timezone must be 1-64 characters"))]
    pub timezone: Option<String>,
}

impl CreateBookingRequest {
    pub fn sanitize(&mut self) {
        self.guest_name = self.guest_name.trim().to_string();
        self.guest_email = self.guest_email.trim().to_lowercase();
        self.guest_phone = crate::utils::trim_optional_field(self.guest_phone.as_ref());
        self.notes = crate::utils::trim_optional_field(self.notes.as_ref());
        self.timezone = crate::utils::trim_optional_field(self.timezone.as_ref());
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({ "status": "declined", "cancellation_reason": "Out of office" }))]
pub struct UpdateBookingStatusRequest {
    /// `confirmed` or `declined`
    pub status: BookingStatus,
    /// Required when declining
    pub cancellation_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_compute_end_at_adds_duration() {
        assert_eq!(compute_end_at(at(10, 0), 30), at(10, 30));
        assert_eq!(compute_end_at(at(23, 45), 30), at(23, 45) + Duration::minutes(30));
        assert_eq!(compute_end_at(at(9, 0), 480), at(17, 0));
    }

    #[test]
    fn test_status_transitions() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Declined));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Confirmed.can_transition_to(Declined));
        assert!(!Confirmed.can_transition_to(Confirmed));
        assert!(!Declined.can_transition_to(Confirmed));
        assert!(!Declined.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_value(BookingStatus::Cancelled).unwrap(),
            "cancelled"
        );
        let parsed: UpdateBookingStatusRequest =
            serde_json::from_value(serde_json::json!({ "status": "confirmed" })).unwrap();
        assert_eq!(parsed.status, BookingStatus::Confirmed);
        assert!(parsed.cancellation_reason.is_none());
    }

    #[test]
    fn test_create_request_validation() {
        let mut request: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "event_id": Uuid::new_v4(),
            "guest_name": "  Lee  ",
            "guest_email": " Guest@Example.com ",
            "scheduled_at": "2024-03-04T10:00:00Z",
            "timezone": "   "
        }))
        .unwrap();
        request.sanitize();

        assert!(request.validate().is_ok());
        assert_eq!(request.guest_name, "Lee");
        assert_eq!(request.guest_email, "guest@example.com");
        assert!(request.timezone.is_none());
        assert_eq!(request.scheduled_at, at(10, 0));
    }

    #[test]
    fn test_create_request_rejects_bad_fields() {
        let mut request: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "event_id": Uuid::new_v4(),
            "guest_name": "   ",
            "guest_email": "nope",
            "scheduled_at": "2024-03-04T10:00:00+09:00"
        }))
        .unwrap();
        request.sanitize();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("guest_name"));
        assert!(fields.contains_key("guest_email"));
    }

    #[test]
    fn test_scheduled_at_must_be_iso8601() {
        let result: Result<CreateBookingRequest, _> = serde_json::from_value(serde_json::json!({
            "event_id": Uuid::new_v4(),
            "guest_name": "Lee",
            "guest_email": "lee@example.com",
            "scheduled_at": "next tuesday"
        }));
        assert!(result.is_err());
    }
}
