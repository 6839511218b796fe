//! SurrealDB repository implementations.

mod booking;
mod otp;
mod property;
mod review;
mod user;

pub use booking::SurrealBookingRepository;
pub use otp::SurrealOtpRepository;
pub use property::SurrealPropertyRepository;
pub use review::SurrealReviewRepository;
pub use user::SurrealUserRepository;
