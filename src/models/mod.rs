pub mod auth;
pub mod availability;
pub mod booking;
pub mod event;
pub mod user;

// Re-export common types
pub use auth::AccessTokenClaims;
pub use availability::{Availability, AvailabilityInput};
pub use booking::{Booking, BookingStatus, BookingWithEvent};
pub use event::{Event, EventWithAvailabilities, LocationType, PublicEvent};
pub use user::{User, UserError, UserProfile};
