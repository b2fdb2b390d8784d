// Availability Database Model
// A recurring weekly window during which an event can be booked

use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    schema::availabilities,
    utils::{api_error::FieldError, validation::parse_time_of_day},
};

/// Days are numbered like JavaScript's `Date#getDay`: 0 = Sunday
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations, ToSchema,
)]
#[diesel(table_name = availabilities)]
#[diesel(belongs_to(crate::models::event::Event))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Availability {
    pub id: Uuid,
    pub event_id: Uuid,
    pub day_of_week: i32,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:00:00")]
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = availabilities)]
pub struct NewAvailability {
    pub id: Uuid,
    pub event_id: Uuid,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

/// Availability as sent by clients, times are `HH:MM` strings
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({
    "day_of_week": 1,
    "start_time": "09:00",
    "end_time": "17:00"
}))]
pub struct AvailabilityInput {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl AvailabilityInput {
    /// Validate and convert into an insertable row
    ///
    /// `field_prefix` names the field in error messages, e.g. `availabilities[2]`.
    pub fn to_new(
        &self,
        event_id: Uuid,
        field_prefix: &str,
    ) -> Result<NewAvailability, Vec<FieldError>> {
        let mut errors = Vec::new();
        let field = |name: &str| {
            if field_prefix.is_empty() {
                name.to_string()
            } else {
                format!("{}.{}", field_prefix, name)
            }
        };

        if !(0..=6).contains(&self.day_of_week) {
            errors.push(FieldError::new(
                field("day_of_week"),
                "Day of week must be between 0 (Sunday) and 6 (Saturday)",
            ));
        }

        let start = parse_time_of_day(&self.start_time)
            .map_err(|msg| errors.push(FieldError::new(field("start_time"), msg)))
            .ok();
        let end = parse_time_of_day(&self.end_time)
            .map_err(|msg| errors.push(FieldError::new(field("end_time"), msg)))
            .ok();

        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                errors.push(FieldError::new(
                    field("end_time"),
                    "End time must be after start time",
                ));
            }
        }

        match (start, end) {
            (Some(start_time), Some(end_time)) if errors.is_empty() => Ok(NewAvailability {
                id: Uuid::new_v4(),
                event_id,
                day_of_week: self.day_of_week,
                start_time,
                end_time,
                is_active: self.is_active,
            }),
            _ => Err(errors),
        }
    }
}

/// Validate a list of inputs, collecting every error before failing
pub fn validate_inputs(
    inputs: &[AvailabilityInput],
    event_id: Uuid,
) -> Result<Vec<NewAvailability>, Vec<FieldError>> {
    let mut rows = Vec::with_capacity(inputs.len());
    let mut errors = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        match input.to_new(event_id, &format!("availabilities[{}]", index)) {
            Ok(row) => rows.push(row),
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(day: i32, start: &str, end: &str) -> AvailabilityInput {
        AvailabilityInput {
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_valid_weekday_window() {
        let event_id = Uuid::new_v4();
        let row = input(1, "09:00", "17:00")
            .to_new(event_id, "")
            .expect("valid availability");

        assert_eq!(row.event_id, event_id);
        assert_eq!(row.day_of_week, 1);
        assert_eq!(row.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(row.end_time, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(DAY_NAMES[row.day_of_week as usize], "Monday");
    }

    #[test]
    fn test_day_of_week_out_of_range() {
        let errors = input(7, "09:00", "10:00")
            .to_new(Uuid::new_v4(), "")
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "day_of_week");
    }

    #[test]
    fn test_end_must_follow_start() {
        let errors = input(2, "10:00", "10:00")
            .to_new(Uuid::new_v4(), "")
            .unwrap_err();
        assert_eq!(errors[0].field, "end_time");
    }

    #[test]
    fn test_validate_inputs_reports_indexed_fields() {
        let inputs = vec![input(1, "09:00", "12:00"), input(3, "bad", "12:00")];
        let errors = validate_inputs(&inputs, Uuid::new_v4()).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "availabilities[1].start_time");
    }

    #[test]
    fn test_is_active_defaults_to_true() {
        let parsed: AvailabilityInput = serde_json::from_value(serde_json::json!({
            "day_of_week": 5,
            "start_time": "13:00",
            "end_time": "18:00"
        }))
        .unwrap();
        assert!(parsed.is_active);
    }
}
