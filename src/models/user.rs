// User Database Model
// Hosts who own events and receive bookings

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::users;

/// User database model - queryable from database
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub timezone: String,
    pub google_calendar_id: Option<String>,
    pub outlook_calendar_id: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user for insertion
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub timezone: String,
}

impl NewUser {
    pub fn new(email: &str, password_hash: String, name: &str, timezone: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            password_hash,
            name: name.trim().to_string(),
            timezone: timezone.to_string(),
        }
    }
}

/// Profile fields a host may change about themselves
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub google_calendar_id: Option<Option<String>>,
    pub outlook_calendar_id: Option<Option<String>>,
    pub profile_image: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.timezone.is_none()
            && self.google_calendar_id.is_none()
            && self.outlook_calendar_id.is_none()
            && self.profile_image.is_none()
    }
}

/// Public projection of a user, never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub timezone: String,
    pub google_calendar_id: Option<String>,
    pub outlook_calendar_id: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            profile_image: user.profile_image,
            timezone: user.timezone,
            google_calendar_id: user.google_calendar_id,
            outlook_calendar_id: user.outlook_calendar_id,
            is_active: user.is_active,
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Errors for user operations
#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("User not found")]
    NotFound,

    #[error("Email is already registered")]
    EmailTaken,
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        users
            .filter(id.eq(user_id))
            .first::<User>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;
        use diesel::PgTextExpressionMethods;

        users
            .filter(email.ilike(email_str.trim()))
            .first::<User>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Create a new user
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_user: NewUser,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;
        use diesel::result::{DatabaseErrorKind, Error};

        diesel::insert_into(users)
            .values(&new_user)
            .get_result::<User>(conn)
            .await
            .map_err(|e| match e {
                Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    UserError::EmailTaken
                },
                _ => UserError::Database(e),
            })
    }

    /// Update profile fields
    pub async fn update(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        mut update: UserUpdate,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        update.updated_at = Some(Utc::now());

        diesel::update(users.filter(id.eq(user_id)))
            .set(&update)
            .get_result::<User>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Replace the stored password hash
    pub async fn update_password(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        new_hash: &str,
    ) -> Result<(), UserError> {
        use crate::schema::users::dsl::*;

        let updated = diesel::update(users.filter(id.eq(user_id)))
            .set((password_hash.eq(new_hash), updated_at.eq(Utc::now())))
            .execute(conn)
            .await?;

        if updated == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }

    /// Bump `updated_at`, e.g. on sign-in
    pub async fn touch(conn: &mut AsyncPgConnection, user_id: Uuid) -> Result<(), UserError> {
        use crate::schema::users::dsl::*;

        diesel::update(users.filter(id.eq(user_id)))
            .set(updated_at.eq(Utc::now()))
            .execute(conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "host@moyak.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            name: "Host".to_string(),
            profile_image: None,
            timezone: "Asia/Seoul".to_string(),
            google_calendar_id: None,
            outlook_calendar_id: None,
            is_active: true,
            email_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "host@moyak.com");

        let profile = serde_json::to_value(UserProfile::from(sample_user())).unwrap();
        assert!(profile.get("password_hash").is_none());
        assert_eq!(profile["timezone"], "Asia/Seoul");
    }

    #[test]
    fn test_new_user_normalizes_email_and_name() {
        let user = NewUser::new("  Host@Moyak.COM ", "hash".into(), "  Kim ", "Asia/Seoul");
        assert_eq!(user.email, "host@moyak.com");
        assert_eq!(user.name, "Kim");
    }

    #[test]
    fn test_user_update_is_empty() {
        assert!(UserUpdate::default().is_empty());

        let update = UserUpdate {
            timezone: Some("UTC".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
