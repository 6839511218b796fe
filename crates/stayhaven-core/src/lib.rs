//! Stayhaven Core — domain models, repository traits, and the shared
//! error type for the rental marketplace.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{HavenError, HavenResult};
