// Event Database Model
// A bookable meeting type owned by a host

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::availability::{Availability, AvailabilityInput},
    schema::events,
};

// =============================================================================
// LOCATION TYPE
// =============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Online,
    Phone,
    InPerson,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Online => "online",
            LocationType::Phone => "phone",
            LocationType::InPerson => "in_person",
        }
    }
}

impl Default for LocationType {
    fn default() -> Self {
        LocationType::Online
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(LocationType::Online),
            "phone" => Ok(LocationType::Phone),
            "in_person" => Ok(LocationType::InPerson),
            _ => Err(format!("Invalid location type: {}", s)),
        }
    }
}

impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for LocationType
where
    DB: diesel::backend::Backend,
    String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
        let value = String::from_sql(bytes)?;
        Self::from_str(&value).map_err(|e| e.into())
    }
}

impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for LocationType
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
// DATABASE MODELS
// =============================================================================

pub const DEFAULT_DURATION_MINUTES: i32 = 30;
pub const DEFAULT_COLOR: &str = "#1890ff";
pub const DEFAULT_MAX_BOOKINGS_PER_DAY: i32 = 10;
pub const DEFAULT_ADVANCE_BOOKING_DAYS: i32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Minutes
    pub duration: i32,
    pub location_type: LocationType,
    pub location_details: Option<String>,
    pub color: String,
    pub is_active: bool,
    pub booking_link: String,
    pub buffer_time_before: i32,
    pub buffer_time_after: i32,
    pub max_bookings_per_day: i32,
    /// Days
    pub advance_booking_limit: i32,
    pub cancellation_policy: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration: i32,
    pub location_type: LocationType,
    pub location_details: Option<String>,
    pub color: String,
    pub is_active: bool,
    pub booking_link: String,
    pub buffer_time_before: i32,
    pub buffer_time_after: i32,
    pub max_bookings_per_day: i32,
    pub advance_booking_limit: i32,
    pub cancellation_policy: Option<String>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = events)]
pub struct EventChangeset {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub duration: Option<i32>,
    pub location_type: Option<LocationType>,
    pub location_details: Option<Option<String>>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
    pub buffer_time_before: Option<i32>,
    pub buffer_time_after: Option<i32>,
    pub max_bookings_per_day: Option<i32>,
    pub advance_booking_limit: Option<i32>,
    pub cancellation_policy: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Event together with its weekly availability windows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventWithAvailabilities {
    #[serde(flatten)]
    pub event: Event,
    pub availabilities: Vec<Availability>,
}

/// Host details exposed on the public booking page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventHost {
    pub name: String,
    pub timezone: String,
    pub profile_image: Option<String>,
}

/// What a guest sees when opening a booking link
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration: i32,
    pub location_type: LocationType,
    pub location_details: Option<String>,
    pub color: String,
    pub booking_link: String,
    pub buffer_time_before: i32,
    pub buffer_time_after: i32,
    pub max_bookings_per_day: i32,
    pub advance_booking_limit: i32,
    pub cancellation_policy: Option<String>,
    pub host: EventHost,
    pub availabilities: Vec<Availability>,
}

impl PublicEvent {
    pub fn new(event: Event, host: EventHost, availabilities: Vec<Availability>) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            duration: event.duration,
            location_type: event.location_type,
            location_details: event.location_details,
            color: event.color,
            booking_link: event.booking_link,
            buffer_time_before: event.buffer_time_before,
            buffer_time_after: event.buffer_time_after,
            max_bookings_per_day: event.max_bookings_per_day,
            advance_booking_limit: event.advance_booking_limit,
            cancellation_policy: event.cancellation_policy,
            host,
            availabilities,
        }
    }
}

// =============================================================================
// BOOKING LINK
// =============================================================================

const BOOKING_LINK_PREFIX: &str = "moyak";
const BOOKING_LINK_SUFFIX_LEN: usize = 6;
const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a public booking link token: `moyak-{unix_millis}-{6 base36 chars}`
pub fn generate_booking_link() -> String {
    generate_booking_link_at(Utc::now())
}

pub fn generate_booking_link_at(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..BOOKING_LINK_SUFFIX_LEN)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
        .collect();

    format!(
        "{}-{}-{}",
        BOOKING_LINK_PREFIX,
        now.timestamp_millis(),
        suffix
    )
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

lazy_static! {
    static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "title": "30분 미팅",
    "duration": 30,
    "location_type": "online",
    "location_details": "Zoom link will be shared",
    "availabilities": [
        { "day_of_week": 1, "start_time": "09:00", "end_time": "17:00" }
    ]
}))]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required (max 255 characters)"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be less than 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes"))]
    #[serde(default = "default_duration")]
    pub duration: i32,

    #[serde(default)]
    pub location_type: LocationType,

    #[validate(length(max = 2000, message = "Location details must be less than 2000 characters"))]
    pub location_details: Option<String>,

    #[validate(regex(path = "HEX_COLOR_REGEX", message = "Color must be a hex value like #1890ff"))]
    pub color: Option<String>,

    #[validate(range(min = 0, max = 480, message = "Buffer time must be between 0 and 480 minutes"))]
    pub buffer_time_before: Option<i32>,

    #[validate(range(min = 0, max = 480, message = "Buffer time must be between 0 and 480 minutes"))]
    pub buffer_time_after: Option<i32>,

    #[validate(range(min = 1, max = 100, message = "Max bookings per day must be between 1 and 100"))]
    pub max_bookings_per_day: Option<i32>,

    #[validate(range(min = 1, max = 365, message = "Advance booking limit must be between 1 and 365 days"))]
    pub advance_booking_limit: Option<i32>,

    #[validate(length(max = 5000, message = "Cancellation policy must be less than 5000 characters"))]
    pub cancellation_policy: Option<String>,

    #[serde(default)]
    pub availabilities: Vec<AvailabilityInput>,
}

fn default_duration() -> i32 {
    DEFAULT_DURATION_MINUTES
}

impl CreateEventRequest {
    /// Trim text fields before validation
    pub fn sanitize(&mut self) {
        self.title = self.title.trim().to_string();
        self.description = crate::utils::trim_optional_field(self.description.as_ref());
        self.location_details = crate::utils::trim_optional_field(self.location_details.as_ref());
        self.cancellation_policy =
            crate::utils::trim_optional_field(self.cancellation_policy.as_ref());
    }

    pub fn into_new_event(self, user_id: Uuid) -> NewEvent {
        NewEvent {
            id: Uuid::new_v4(),
            user_id,
            title: self.title,
            description: self.description,
            duration: self.duration,
            location_type: self.location_type,
            location_details: self.location_details,
            color: self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            is_active: true,
            booking_link: generate_booking_link(),
            buffer_time_before: self.buffer_time_before.unwrap_or(0),
            buffer_time_after: self.buffer_time_after.unwrap_or(0),
            max_bookings_per_day: self
                .max_bookings_per_day
                .unwrap_or(DEFAULT_MAX_BOOKINGS_PER_DAY),
            advance_booking_limit: self
                .advance_booking_limit
                .unwrap_or(DEFAULT_ADVANCE_BOOKING_DAYS),
            cancellation_policy: self.cancellation_policy,
        }
    }
}

/// Partial update; omitted fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required (max 255 characters)"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be less than 5000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes"))]
    pub duration: Option<i32>,

    pub location_type: Option<LocationType>,

    #[validate(length(max = 2000, message = "Location details must be less than 2000 characters"))]
    pub location_details: Option<String>,

    #[validate(regex(path = "HEX_COLOR_REGEX", message = "Color must be a hex value like #1890ff"))]
    pub color: Option<String>,

    pub is_active: Option<bool>,

    #[validate(range(min = 0, max = 480, message = "Buffer time must be between 0 and 480 minutes"))]
    pub buffer_time_before: Option<i32>,

    #[validate(range(min = 0, max = 480, message = "Buffer time must be between 0 and 480 minutes"))]
    pub buffer_time_after: Option<i32>,

    #[validate(range(min = 1, max = 100, message = "Max bookings per day must be between 1 and 100"))]
    pub max_bookings_per_day: Option<i32>,

    #[validate(range(min = 1, max = 365, message = "Advance booking limit must be between 1 and 365 days"))]
    pub advance_booking_limit: Option<i32>,

    #[validate(length(max = 5000, message = "Cancellation policy must be less than 5000 characters"))]
    pub cancellation_policy: Option<String>,

    /// When present, replaces every availability of the event
    pub availabilities: Option<Vec<AvailabilityInput>>,
}

impl UpdateEventRequest {
    pub fn sanitize(&mut self) {
        self.title = self.title.as_ref().map(|t| t.trim().to_string());
    }

    /// Build the changeset; empty strings clear optional text fields
    pub fn to_changeset(&self) -> EventChangeset {
        let clearable = |value: &Option<String>| {
            value
                .as_ref()
                .map(|v| crate::utils::trim_optional_field(Some(v)))
        };

        EventChangeset {
            title: self.title.clone(),
            description: clearable(&self.description),
            duration: self.duration,
            location_type: self.location_type,
            location_details: clearable(&self.location_details),
            color: self.color.clone(),
            is_active: self.is_active,
            buffer_time_before: self.buffer_time_before,
            buffer_time_after: self.buffer_time_after,
            max_bookings_per_day: self.max_bookings_per_day,
            advance_booking_limit: self.advance_booking_limit,
            cancellation_policy: clearable(&self.cancellation_policy),
            updated_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_request(json: serde_json::Value) -> CreateEventRequest {
        serde_json::from_value(json).expect("valid request json")
    }

    #[test]
    fn test_booking_link_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let link = generate_booking_link_at(now);

        let parts: Vec<&str> = link.splitn(3, '-').collect();
        assert_eq!(parts[0], "moyak");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_booking_links_are_unique() {
        let now = Utc::now();
        let a = generate_booking_link_at(now);
        let b = generate_booking_link_at(now);
        // 36^6 possibilities; a collision here means the suffix is not random
        assert_ne!(a, b);
    }

    #[test]
    fn test_location_type_round_trip() {
        for (text, kind) in [
            ("online", LocationType::Online),
            ("phone", LocationType::Phone),
            ("in_person", LocationType::InPerson),
        ] {
            assert_eq!(LocationType::from_str(text), Ok(kind));
            assert_eq!(kind.as_str(), text);
            assert_eq!(serde_json::to_value(kind).unwrap(), text);
        }
        assert!(LocationType::from_str("carrier_pigeon").is_err());
    }

    #[test]
    fn test_create_request_defaults() {
        let request = create_request(serde_json::json!({ "title": "Intro call" }));
        assert!(request.validate().is_ok());

        let new_event = request.into_new_event(Uuid::new_v4());
        assert_eq!(new_event.duration, 30);
        assert_eq!(new_event.location_type, LocationType::Online);
        assert_eq!(new_event.color, "#1890ff");
        assert_eq!(new_event.max_bookings_per_day, 10);
        assert_eq!(new_event.advance_booking_limit, 30);
        assert_eq!(new_event.buffer_time_before, 0);
        assert!(new_event.is_active);
        assert!(new_event.booking_link.starts_with("moyak-"));
    }

    #[test]
    fn test_duration_bounds() {
        for (duration, ok) in [(4, false), (5, true), (480, true), (481, false)] {
            let request = create_request(serde_json::json!({
                "title": "Call",
                "duration": duration
            }));
            assert_eq!(request.validate().is_ok(), ok, "duration {}", duration);
        }
    }

    #[test]
    fn test_invalid_location_type_rejected_by_serde() {
        let result: Result<CreateEventRequest, _> = serde_json::from_value(serde_json::json!({
            "title": "Call",
            "location_type": "zoom"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_title_rejected_after_sanitize() {
        let mut request = create_request(serde_json::json!({ "title": "   " }));
        request.sanitize();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_color_validation() {
        let request = create_request(serde_json::json!({ "title": "Call", "color": "blue" }));
        assert!(request.validate().is_err());

        let request = create_request(serde_json::json!({ "title": "Call", "color": "#52C41A" }));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_changeset_clears_blank_text() {
        let request = UpdateEventRequest {
            description: Some("   ".to_string()),
            duration: Some(45),
            ..Default::default()
        };
        let changeset = request.to_changeset();

        assert_eq!(changeset.description, Some(None));
        assert_eq!(changeset.duration, Some(45));
        assert!(changeset.title.is_none());
        assert!(changeset.location_details.is_none());
    }
}
