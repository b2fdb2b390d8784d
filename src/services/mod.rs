// Services module for MOYAK Backend
// Business logic layer for the application

pub mod booking;
pub mod dashboard;
pub mod email;
pub mod event;
pub mod jwt;

// Re-export commonly used services
pub use booking::BookingService;
pub use dashboard::{DashboardService, DashboardStats};
pub use email::{BookingNotifier, EmailError, EmailService, NotificationKind};
pub use event::EventService;
pub use jwt::{JwtConfig, JwtError, JwtService};
