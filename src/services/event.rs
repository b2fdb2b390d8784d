// Event service - host-owned event types and their weekly availability

use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{
        availability::{validate_inputs, Availability, AvailabilityInput},
        event::{CreateEventRequest, Event, EventHost, EventWithAvailabilities, PublicEvent, UpdateEventRequest},
        user::User,
    },
    schema::{availabilities, events, users},
    utils::api_error::{ApiError, ApiResult},
};

pub struct EventService {
    diesel_pool: DieselPool,
}

impl EventService {
    pub fn new(state: &AppState) -> Self {
        Self::with_pool(state.diesel_pool.clone())
    }

    pub fn with_pool(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    /// The host's events, newest first, each with its availabilities
    pub async fn list(&self, host_id: Uuid) -> ApiResult<Vec<EventWithAvailabilities>> {
        let mut conn = self.diesel_pool.get().await?;

        let host_events = events::table
            .filter(events::user_id.eq(host_id))
            .order(events::created_at.desc())
            .select(Event::as_select())
            .load::<Event>(&mut conn)
            .await?;

        let windows = Availability::belonging_to(&host_events)
            .order((availabilities::day_of_week.asc(), availabilities::start_time.asc()))
            .select(Availability::as_select())
            .load::<Availability>(&mut conn)
            .await?;

        Ok(windows
            .grouped_by(&host_events)
            .into_iter()
            .zip(host_events)
            .map(|(availabilities, event)| EventWithAvailabilities {
                event,
                availabilities,
            })
            .collect())
    }

    pub async fn get(&self, host_id: Uuid, event_id: Uuid) -> ApiResult<EventWithAvailabilities> {
        let mut conn = self.diesel_pool.get().await?;
        let event = owned_event(&mut conn, host_id, event_id).await?;
        let availabilities = load_availabilities(&mut conn, event.id, false).await?;

        Ok(EventWithAvailabilities {
            event,
            availabilities,
        })
    }

    /// Create an event together with its availabilities
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        host_id: Uuid,
        mut request: CreateEventRequest,
    ) -> ApiResult<EventWithAvailabilities> {
        request.sanitize();
        request.validate()?;

        let inputs = std::mem::take(&mut request.availabilities);
        let new_event = request.into_new_event(host_id);
        let new_windows = validate_inputs(&inputs, new_event.id).map_err(ApiError::Validation)?;

        let mut conn = self.diesel_pool.get().await?;
        let created = conn
            .transaction::<_, ApiError, _>(|tx| {
                Box::pin(async move {
                    let event = diesel::insert_into(events::table)
                        .values(&new_event)
                        .get_result::<Event>(tx)
                        .await?;

                    let availabilities = if new_windows.is_empty() {
                        Vec::new()
                    } else {
                        diesel::insert_into(availabilities::table)
                            .values(&new_windows)
                            .get_results::<Availability>(tx)
                            .await?
                    };

                    Ok(EventWithAvailabilities {
                        event,
                        availabilities,
                    })
                })
            })
            .await?;

        info!(
            event_id = %created.event.id,
            booking_link = %created.event.booking_link,
            "Event created"
        );
        Ok(created)
    }

    /// Partial update; a present `availabilities` list replaces the old one
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        host_id: Uuid,
        event_id: Uuid,
        mut request: UpdateEventRequest,
    ) -> ApiResult<EventWithAvailabilities> {
        request.sanitize();
        request.validate()?;

        let replacement = match &request.availabilities {
            Some(inputs) => Some(validate_inputs(inputs, event_id).map_err(ApiError::Validation)?),
            None => None,
        };
        let changeset = request.to_changeset();

        let mut conn = self.diesel_pool.get().await?;
        let updated = conn
            .transaction::<_, ApiError, _>(|tx| {
                Box::pin(async move {
                    let event = diesel::update(
                        events::table
                            .filter(events::id.eq(event_id))
                            .filter(events::user_id.eq(host_id)),
                    )
                    .set(&changeset)
                    .get_result::<Event>(tx)
                    .await
                    .optional()?
                    .ok_or(ApiError::NotFound("Event"))?;

                    if let Some(new_windows) = replacement {
                        diesel::delete(
                            availabilities::table.filter(availabilities::event_id.eq(event.id)),
                        )
                        .execute(tx)
                        .await?;

                        if !new_windows.is_empty() {
                            diesel::insert_into(availabilities::table)
                                .values(&new_windows)
                                .execute(tx)
                                .await?;
                        }
                    }

                    let availabilities = load_availabilities(tx, event.id, false).await?;
                    Ok(EventWithAvailabilities {
                        event,
                        availabilities,
                    })
                })
            })
            .await?;

        info!(event_id = %event_id, "Event updated");
        Ok(updated)
    }

    /// Delete an event; availabilities and bookings cascade
    #[instrument(skip(self))]
    pub async fn delete(&self, host_id: Uuid, event_id: Uuid) -> ApiResult<()> {
        let mut conn = self.diesel_pool.get().await?;

        let deleted = diesel::delete(
            events::table
                .filter(events::id.eq(event_id))
                .filter(events::user_id.eq(host_id)),
        )
        .execute(&mut conn)
        .await?;

        if deleted == 0 {
            return Err(ApiError::NotFound("Event"));
        }

        info!(event_id = %event_id, "Event deleted");
        Ok(())
    }

    /// What a guest sees behind a booking link; only active data is exposed
    pub async fn find_public(&self, booking_link: &str) -> ApiResult<PublicEvent> {
        let mut conn = self.diesel_pool.get().await?;

        let (event, host) = events::table
            .inner_join(users::table)
            .filter(events::booking_link.eq(booking_link))
            .filter(events::is_active.eq(true))
            .select((Event::as_select(), User::as_select()))
            .first::<(Event, User)>(&mut conn)
            .await
            .optional()?
            .ok_or(ApiError::NotFound("Event"))?;

        let availabilities = load_availabilities(&mut conn, event.id, true).await?;
        let host = EventHost {
            name: host.name,
            timezone: host.timezone,
            profile_image: host.profile_image,
        };

        Ok(PublicEvent::new(event, host, availabilities))
    }

    // =========================================================================
    // AVAILABILITIES
    // =========================================================================

    pub async fn list_availabilities(
        &self,
        host_id: Uuid,
        event_id: Uuid,
    ) -> ApiResult<Vec<Availability>> {
        let mut conn = self.diesel_pool.get().await?;
        let event = owned_event(&mut conn, host_id, event_id).await?;
        Ok(load_availabilities(&mut conn, event.id, false).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn add_availability(
        &self,
        host_id: Uuid,
        event_id: Uuid,
        input: AvailabilityInput,
    ) -> ApiResult<Availability> {
        let new_window = input.to_new(event_id, "").map_err(ApiError::Validation)?;

        let mut conn = self.diesel_pool.get().await?;
        owned_event(&mut conn, host_id, event_id).await?;

        let availability = diesel::insert_into(availabilities::table)
            .values(&new_window)
            .get_result::<Availability>(&mut conn)
            .await?;

        info!(availability_id = %availability.id, "Availability added");
        Ok(availability)
    }

    #[instrument(skip(self))]
    pub async fn delete_availability(
        &self,
        host_id: Uuid,
        event_id: Uuid,
        availability_id: Uuid,
    ) -> ApiResult<()> {
        let mut conn = self.diesel_pool.get().await?;
        owned_event(&mut conn, host_id, event_id).await?;

        let deleted = diesel::delete(
            availabilities::table
                .filter(availabilities::id.eq(availability_id))
                .filter(availabilities::event_id.eq(event_id)),
        )
        .execute(&mut conn)
        .await?;

        if deleted == 0 {
            return Err(ApiError::NotFound("Availability"));
        }

        Ok(())
    }
}

/// Load an event only if the host owns it; otherwise 404
async fn owned_event(conn: &mut AsyncPgConnection, host_id: Uuid, event_id: Uuid) -> ApiResult<Event> {
    events::table
        .filter(events::id.eq(event_id))
        .filter(events::user_id.eq(host_id))
        .select(Event::as_select())
        .first::<Event>(conn)
        .await
        .optional()?
        .ok_or(ApiError::NotFound("Event"))
}

async fn load_availabilities(
    conn: &mut AsyncPgConnection,
    event_id: Uuid,
    active_only: bool,
) -> QueryResult<Vec<Availability>> {
    let mut query = availabilities::table
        .filter(availabilities::event_id.eq(event_id))
        .into_boxed();

    if active_only {
        query = query.filter(availabilities::is_active.eq(true));
    }

    query
        .order((availabilities::day_of_week.asc(), availabilities::start_time.asc()))
        .select(Availability::as_select())
        .load::<Availability>(conn)
        .await
}
