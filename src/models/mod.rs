// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GuestMatch, GuestQuery, IntakeRecord, IntakeResult, SkierType};
pub use requests::{IntakeRequest, LookupRequest};
pub use responses::{ErrorResponse, HealthResponse, LookupResponse};
