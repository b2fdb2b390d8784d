// Dashboard service - per-host booking aggregates

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{booking::BookingStatus, event::LocationType},
    schema::{bookings, events},
    utils::api_error::ApiResult,
};

const RECENT_WINDOW_DAYS: i64 = 30;
const LIST_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Queryable, ToSchema)]
pub struct RecentBooking {
    pub id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub status: BookingStatus,
    pub scheduled_at: DateTime<Utc>,
    pub event_title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Queryable, ToSchema)]
pub struct UpcomingEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration: i32,
    pub location_type: LocationType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_events: i64,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub recent_bookings: Vec<RecentBooking>,
    pub upcoming_events: Vec<UpcomingEvent>,
}

pub struct DashboardService {
    diesel_pool: DieselPool,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    pub async fn stats(&self, host_id: Uuid) -> ApiResult<DashboardStats> {
        self.stats_at(host_id, Utc::now()).await
    }

    pub async fn stats_at(&self, host_id: Uuid, now: DateTime<Utc>) -> ApiResult<DashboardStats> {
        let mut conn = self.diesel_pool.get().await?;

        let total_events = events::table
            .filter(events::user_id.eq(host_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let host_bookings = || {
            bookings::table
                .inner_join(events::table)
                .filter(events::user_id.eq(host_id))
        };

        let total_bookings = host_bookings()
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let pending_bookings = host_bookings()
            .filter(bookings::status.eq(BookingStatus::Pending))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let confirmed_bookings = host_bookings()
            .filter(bookings::status.eq(BookingStatus::Confirmed))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let recent_bookings = host_bookings()
            .filter(bookings::scheduled_at.ge(now - Duration::days(RECENT_WINDOW_DAYS)))
            .order(bookings::created_at.desc())
            .limit(LIST_LIMIT)
            .select((
                bookings::id,
                bookings::guest_name,
                bookings::guest_email,
                bookings::status,
                bookings::scheduled_at,
                events::title,
                bookings::created_at,
            ))
            .load::<RecentBooking>(&mut conn)
            .await?;

        let upcoming_events = events::table
            .filter(events::user_id.eq(host_id))
            .filter(events::is_active.eq(true))
            .order(events::created_at.desc())
            .limit(LIST_LIMIT)
            .select((
                events::id,
                events::title,
                events::description,
                events::duration,
                events::location_type,
                events::created_at,
            ))
            .load::<UpcomingEvent>(&mut conn)
            .await?;

        Ok(DashboardStats {
            total_events,
            total_bookings,
            pending_bookings,
            confirmed_bookings,
            recent_bookings,
            upcoming_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialize_with_camel_case_totals() {
        let stats = DashboardStats {
            total_events: 2,
            total_bookings: 5,
            pending_bookings: 1,
            confirmed_bookings: 3,
            recent_bookings: vec![],
            upcoming_events: vec![],
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalEvents"], 2);
        assert_eq!(json["pendingBookings"], 1);
        assert!(json["recentBookings"].as_array().unwrap().is_empty());
        assert!(json["upcomingEvents"].is_array());
    }
}
