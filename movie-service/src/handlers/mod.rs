pub mod health;
pub mod movies;

pub use health::{health_check, metrics, readiness_check};
