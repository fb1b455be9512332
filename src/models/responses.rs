use serde::{Deserialize, Serialize};
use crate::models::domain::GuestMatch;

/// Response for the lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub matches: Vec<GuestMatch>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub ts: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
