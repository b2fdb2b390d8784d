// Booking service - guest requests, host decisions and the slot conflict check

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{
        booking::{
            compute_end_at, Booking, BookingStatus, BookingStatusChange, BookingWithEvent,
            CreateBookingRequest, EventSummary, NewBooking, UpdateBookingStatusRequest,
        },
        event::Event,
        user::User,
    },
    schema::{bookings, events},
    services::email::{BookingNotice, BookingNotifier, HostContact, NotificationKind},
    utils::api_error::{ApiError, ApiResult},
};

/// What a host action writes to the booking row
enum StatusWrite {
    /// Confirm or decline, replacing the reason
    Decide(BookingStatusChange),
    Cancel,
}

impl StatusWrite {
    fn target(&self) -> BookingStatus {
        match self {
            StatusWrite::Decide(change) => change.status,
            StatusWrite::Cancel => BookingStatus::Cancelled,
        }
    }
}

pub struct BookingService {
    diesel_pool: DieselPool,
    notifier: Arc<dyn BookingNotifier>,
    default_timezone: String,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self::with_notifier(
            state.diesel_pool.clone(),
            state.notifier.clone(),
            state.config.default_timezone.clone(),
        )
    }

    pub fn with_notifier(
        diesel_pool: DieselPool,
        notifier: Arc<dyn BookingNotifier>,
        default_timezone: String,
    ) -> Self {
        Self {
            diesel_pool,
            notifier,
            default_timezone,
        }
    }

    // =========================================================================
    // GUEST
    // =========================================================================

    /// Request a slot on an event
    ///
    /// The event row is locked for the duration of the conflict check and the
    /// insert, so two guests racing for the same slot cannot both win.
    #[instrument(skip(self, request), fields(event_id = %request.event_id))]
    pub async fn create(&self, mut request: CreateBookingRequest) -> ApiResult<Booking> {
        request.sanitize();
        request.validate()?;

        let default_timezone = self.default_timezone.clone();
        let mut conn = self.diesel_pool.get().await?;

        let notice = conn
            .transaction::<_, ApiError, _>(|tx| {
                Box::pin(async move {
                    let event = lock_event(tx, request.event_id)
                        .await?
                        .filter(|event| event.is_active)
                        .ok_or(ApiError::NotFound("Event"))?;

                    let end_at = compute_end_at(request.scheduled_at, event.duration);
                    if has_conflict(
                        tx,
                        event.id,
                        request.scheduled_at,
                        end_at,
                        None,
                        &BookingStatus::BLOCKING,
                    )
                    .await?
                    {
                        return Err(ApiError::BookingConflict);
                    }

                    let new_booking = NewBooking {
                        id: Uuid::new_v4(),
                        event_id: event.id,
                        user_id: event.user_id,
                        guest_name: request.guest_name,
                        guest_email: request.guest_email,
                        guest_phone: request.guest_phone,
                        scheduled_at: request.scheduled_at,
                        end_at,
                        status: BookingStatus::Pending,
                        notes: request.notes,
                        timezone: request.timezone.unwrap_or(default_timezone),
                    };

                    let booking = diesel::insert_into(bookings::table)
                        .values(&new_booking)
                        .get_result::<Booking>(tx)
                        .await?;

                    let host = host_contact(tx, event.user_id).await?;
                    Ok(BookingNotice {
                        booking,
                        event,
                        host,
                    })
                })
            })
            .await?;

        info!(
            booking_id = %notice.booking.id,
            scheduled_at = %notice.booking.scheduled_at,
            "Booking requested"
        );

        self.dispatch(NotificationKind::New, &notice).await;
        Ok(notice.booking)
    }

    // =========================================================================
    // HOST
    // =========================================================================

    /// Every booking on the host's events, latest slot first
    pub async fn list_for_host(&self, host_id: Uuid) -> ApiResult<Vec<BookingWithEvent>> {
        let mut conn = self.diesel_pool.get().await?;

        let rows = bookings::table
            .inner_join(events::table)
            .filter(events::user_id.eq(host_id))
            .order(bookings::scheduled_at.desc())
            .select((Booking::as_select(), EventSummary::as_select()))
            .load::<(Booking, EventSummary)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(booking, event)| BookingWithEvent { booking, event })
            .collect())
    }

    pub async fn get_for_host(&self, host_id: Uuid, booking_id: Uuid) -> ApiResult<BookingWithEvent> {
        let mut conn = self.diesel_pool.get().await?;

        let (booking, event) = bookings::table
            .inner_join(events::table)
            .filter(bookings::id.eq(booking_id))
            .filter(events::user_id.eq(host_id))
            .select((Booking::as_select(), EventSummary::as_select()))
            .first::<(Booking, EventSummary)>(&mut conn)
            .await
            .optional()?
            .ok_or(ApiError::NotFound("Booking"))?;

        Ok(BookingWithEvent { booking, event })
    }

    /// Confirm or decline a pending booking
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_status(
        &self,
        host_id: Uuid,
        booking_id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> ApiResult<Booking> {
        let target = request.status;
        if !matches!(target, BookingStatus::Confirmed | BookingStatus::Declined) {
            return Err(ApiError::field(
                "status",
                "Status must be either 'confirmed' or 'declined'",
            ));
        }

        let reason = crate::utils::trim_optional_field(request.cancellation_reason.as_ref());
        if target == BookingStatus::Declined && reason.is_none() {
            return Err(ApiError::field(
                "cancellation_reason",
                "A reason is required when declining a booking",
            ));
        }

        let change = BookingStatusChange {
            status: target,
            // Confirming clears any earlier reason
            cancellation_reason: match target {
                BookingStatus::Declined => reason,
                _ => None,
            },
            updated_at: Utc::now(),
        };

        let notice = self
            .transition(host_id, booking_id, StatusWrite::Decide(change))
            .await?;

        info!(booking_id = %booking_id, status = %target, "Booking status updated");

        let kind = match target {
            BookingStatus::Confirmed => NotificationKind::Confirmed,
            _ => NotificationKind::Declined,
        };
        self.dispatch(kind, &notice).await;
        Ok(notice.booking)
    }

    /// Cancel a pending or confirmed booking; the stored reason is kept
    #[instrument(skip(self))]
    pub async fn cancel(&self, host_id: Uuid, booking_id: Uuid) -> ApiResult<Booking> {
        let notice = self
            .transition(host_id, booking_id, StatusWrite::Cancel)
            .await?;

        info!(booking_id = %booking_id, "Booking cancelled");

        self.dispatch(NotificationKind::Cancelled, &notice).await;
        Ok(notice.booking)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Lock the event and booking, check the move is legal, then write it
    async fn transition(
        &self,
        host_id: Uuid,
        booking_id: Uuid,
        write: StatusWrite,
    ) -> ApiResult<BookingNotice> {
        let target = write.target();
        let mut conn = self.diesel_pool.get().await?;

        conn.transaction::<_, ApiError, _>(|tx| {
            Box::pin(async move {
                // Ownership goes through the event
                let event_id = bookings::table
                    .inner_join(events::table)
                    .filter(bookings::id.eq(booking_id))
                    .filter(events::user_id.eq(host_id))
                    .select(bookings::event_id)
                    .first::<Uuid>(tx)
                    .await
                    .optional()?
                    .ok_or(ApiError::NotFound("Booking"))?;

                // Event first, then booking: same lock order as creation
                let event = lock_event(tx, event_id)
                    .await?
                    .ok_or(ApiError::NotFound("Booking"))?;
                let booking = bookings::table
                    .find(booking_id)
                    .for_update()
                    .first::<Booking>(tx)
                    .await?;

                if target == BookingStatus::Cancelled && booking.status == BookingStatus::Cancelled {
                    return Err(ApiError::AlreadyCancelled);
                }
                if !booking.status.can_transition_to(target) {
                    return Err(ApiError::InvalidTransition {
                        from: booking.status.to_string(),
                        to: target.to_string(),
                    });
                }

                if target == BookingStatus::Confirmed
                    && has_conflict(
                        tx,
                        event.id,
                        booking.scheduled_at,
                        booking.end_at,
                        Some(booking.id),
                        &[BookingStatus::Confirmed],
                    )
                    .await?
                {
                    return Err(ApiError::BookingConflict);
                }

                let target_row = bookings::table.find(booking.id);
                let booking = match write {
                    StatusWrite::Decide(change) => {
                        diesel::update(target_row)
                            .set(&change)
                            .get_result::<Booking>(tx)
                            .await?
                    },
                    StatusWrite::Cancel => {
                        diesel::update(target_row)
                            .set((
                                bookings::status.eq(BookingStatus::Cancelled),
                                bookings::updated_at.eq(Utc::now()),
                            ))
                            .get_result::<Booking>(tx)
                            .await?
                    },
                };
                let host = host_contact(tx, event.user_id).await?;

                Ok(BookingNotice {
                    booking,
                    event,
                    host,
                })
            })
        })
        .await
    }

    /// Notifications never fail the request
    async fn dispatch(&self, kind: NotificationKind, notice: &BookingNotice) {
        if let Err(e) = self.notifier.notify(kind, notice).await {
            warn!(
                booking_id = %notice.booking.id,
                ?kind,
                error = %e,
                "Booking notification failed"
            );
        }
    }
}

/// `SELECT ... FOR UPDATE` on the event row
async fn lock_event(conn: &mut AsyncPgConnection, event_id: Uuid) -> QueryResult<Option<Event>> {
    events::table
        .find(event_id)
        .for_update()
        .first::<Event>(conn)
        .await
        .optional()
}

/// Does `[start, end)` overlap any booking of the event in one of `statuses`?
/// Back-to-back slots do not overlap.
async fn has_conflict(
    conn: &mut AsyncPgConnection,
    event_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
    statuses: &[BookingStatus],
) -> QueryResult<bool> {
    let mut query = bookings::table
        .filter(bookings::event_id.eq(event_id))
        .filter(bookings::status.eq_any(statuses.to_vec()))
        .filter(bookings::scheduled_at.lt(end))
        .filter(bookings::end_at.gt(start))
        .into_boxed();

    if let Some(id) = exclude {
        query = query.filter(bookings::id.ne(id));
    }

    diesel::select(diesel::dsl::exists(query))
        .get_result::<bool>(conn)
        .await
}

async fn host_contact(conn: &mut AsyncPgConnection, host_id: Uuid) -> ApiResult<HostContact> {
    let host = User::find_by_id(conn, host_id).await?;
    Ok(HostContact {
        name: host.name,
        email: host.email,
    })
}
