// Seeds a development database with sample hosts, an event and bookings
// Safe to run twice: an existing admin account leaves the data untouched

use anyhow::{Context, Result};
use chrono::{DurationRound, Duration, NaiveTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use moyak_backend::{
    app_config::AppConfig,
    migrations,
    models::{
        availability::NewAvailability,
        booking::{compute_end_at, BookingStatus, NewBooking},
        event::{generate_booking_link, LocationType, NewEvent},
        user::{NewUser, User, UserError},
    },
    schema::{availabilities, bookings, events},
    utils::{hash_password_with_config, PasswordConfig},
};

const ADMIN_EMAIL: &str = "admin@moyak.com";
const ADMIN_PASSWORD: &str = "admin123";
const USER_EMAIL: &str = "user@moyak.com";
const USER_PASSWORD: &str = "user123";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moyak_seed=info,moyak_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    migrations::run_all_migrations(&config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to run migrations")?;

    let mut conn = AsyncPgConnection::establish(&config.database.url)
        .await
        .context("Failed to connect to the database")?;

    match User::find_by_email(&mut conn, ADMIN_EMAIL).await {
        Ok(_) => {
            info!("Sample data already present, nothing to do");
            return Ok(());
        },
        Err(UserError::NotFound) => {},
        Err(e) => return Err(e).context("Failed to look up the admin account"),
    }

    seed(&mut conn, &config).await?;

    info!("📧 Admin account: {} / {}", ADMIN_EMAIL, ADMIN_PASSWORD);
    info!("📧 Test account: {} / {}", USER_EMAIL, USER_PASSWORD);
    Ok(())
}

async fn seed(conn: &mut AsyncPgConnection, config: &AppConfig) -> Result<()> {
    let password_config = PasswordConfig::with_cost(config.security.bcrypt_cost);
    let timezone = config.default_timezone.as_str();

    let admin = User::create(
        conn,
        NewUser::new(
            ADMIN_EMAIL,
            hash_password_with_config(ADMIN_PASSWORD, &password_config)?,
            "관리자",
            timezone,
        ),
    )
    .await?;

    User::create(
        conn,
        NewUser::new(
            USER_EMAIL,
            hash_password_with_config(USER_PASSWORD, &password_config)?,
            "테스트 사용자",
            timezone,
        ),
    )
    .await?;
    info!("✅ Sample users created");

    let event = NewEvent {
        id: Uuid::new_v4(),
        user_id: admin.id,
        title: "미팅 예약".to_string(),
        description: Some("업무 미팅을 위한 예약입니다.".to_string()),
        duration: 30,
        location_type: LocationType::Online,
        location_details: Some("Zoom 링크".to_string()),
        color: "#1890ff".to_string(),
        is_active: true,
        booking_link: generate_booking_link(),
        buffer_time_before: 5,
        buffer_time_after: 5,
        max_bookings_per_day: 10,
        advance_booking_limit: 30,
        cancellation_policy: Some("24시간 전까지 취소 가능".to_string()),
    };

    let open = NaiveTime::from_hms_opt(9, 0, 0).context("invalid opening time")?;
    let close = NaiveTime::from_hms_opt(17, 0, 0).context("invalid closing time")?;

    // Monday through Friday
    let weekdays: Vec<NewAvailability> = (1..=5)
        .map(|day_of_week| NewAvailability {
            id: Uuid::new_v4(),
            event_id: event.id,
            day_of_week,
            start_time: open,
            end_time: close,
            is_active: true,
        })
        .collect();

    let next_hour = Utc::now().duration_trunc(Duration::hours(1))? + Duration::hours(1);
    let sample_booking = |guest: (&str, &str, &str), days: i64, status: BookingStatus, notes: &str| {
        let (guest_name, guest_email, guest_phone) = guest;
        let scheduled_at = next_hour + Duration::days(days);
        NewBooking {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_id: admin.id,
            guest_name: guest_name.to_string(),
            guest_email: guest_email.to_string(),
            guest_phone: Some(guest_phone.to_string()),
            scheduled_at,
            end_at: compute_end_at(scheduled_at, event.duration),
            status,
            notes: Some(notes.to_string()),
            timezone: timezone.to_string(),
        }
    };

    let sample_bookings = vec![
        sample_booking(
            ("김철수", "kim@example.com", "010-1234-5678"),
            1,
            BookingStatus::Confirmed,
            "첫 번째 미팅입니다.",
        ),
        sample_booking(
            ("이영희", "lee@example.com", "010-9876-5432"),
            2,
            BookingStatus::Pending,
            "상담 예약입니다.",
        ),
    ];

    conn.transaction::<_, diesel::result::Error, _>(|tx| {
        Box::pin(async move {
            diesel::insert_into(events::table)
                .values(&event)
                .execute(tx)
                .await?;
            diesel::insert_into(availabilities::table)
                .values(&weekdays)
                .execute(tx)
                .await?;
            diesel::insert_into(bookings::table)
                .values(&sample_bookings)
                .execute(tx)
                .await?;
            Ok(())
        })
    })
    .await
    .context("Failed to insert the sample event")?;

    info!("✅ Sample event, availabilities and bookings created");
    Ok(())
}
