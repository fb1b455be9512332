//! Pats Peak guest intake
//!
//! A two-step intake service for the rental shop: look a guest up in the
//! upstream registry, then submit their fitting details. This library holds
//! the validation rules, the registry clients (real and mock), the HTTP
//! surface and a headless version of the browser wizard.

pub mod config;
pub mod core;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod wizard;

// Re-export commonly used types
pub use core::{validate_intake, validate_lookup, Violations};
pub use errors::ApiError;
pub use models::{GuestMatch, GuestQuery, IntakeRecord, IntakeRequest, IntakeResult, LookupRequest, SkierType};
pub use services::{build_registry, GuestRegistry, MockRegistry, UpstreamClient, UpstreamError};
