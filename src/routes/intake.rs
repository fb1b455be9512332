use actix_web::{web, HttpResponse};
use chrono::Utc;
use crate::core::{validate_intake, validate_lookup};
use crate::errors::ApiError;
use crate::models::{HealthResponse, IntakeRequest, IntakeResult, LookupRequest, LookupResponse};
use crate::services::GuestRegistry;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn GuestRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<dyn GuestRegistry>) -> Self {
        Self { registry }
    }
}

/// Configure the intake API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/lookup", web::post().to(lookup))
        .route("/intake", web::post().to(intake));
}

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        ts: Utc::now(),
    })
}

/// Guest lookup endpoint
///
/// POST /api/lookup
///
/// Request body:
/// ```json
/// {
///   "firstName": "string",
///   "lastName": "string",
///   "dob": "YYYY-MM-DD",
///   "zip": "12345",
///   "phone": "603-555-0100"
/// }
/// ```
async fn lookup(
    state: web::Data<AppState>,
    req: web::Json<LookupRequest>,
) -> Result<HttpResponse, ApiError> {
    let query = validate_lookup(&req, Utc::now()).map_err(|violations| {
        tracing::info!("Lookup rejected: fields={:?}", violations.fields());
        violations
    })?;

    let matches = state.registry.search_guests(&query).await.map_err(|e| {
        tracing::error!("Guest search via {} failed: {}", state.registry.name(), e);
        e
    })?;

    tracing::info!("Lookup returned {} matches via {}", matches.len(), state.registry.name());

    Ok(HttpResponse::Ok().json(LookupResponse { matches }))
}

/// Intake submission endpoint
///
/// POST /api/intake
///
/// Request body:
/// ```json
/// {
///   "guestId": "string|null",
///   "firstName": "string",
///   "lastName": "string",
///   "dob": "YYYY-MM-DD",
///   "zip": "12345",
///   "phone": "603-555-0100",
///   "skierType": "I|II|III",
///   "weightLbs": 150,
///   "heightIn": 66,
///   "shoeSize": 9.5,
///   "email": "guest@example.com"
/// }
/// ```
async fn intake(
    state: web::Data<AppState>,
    req: web::Json<IntakeRequest>,
) -> Result<HttpResponse, ApiError> {
    let record = validate_intake(&req, Utc::now()).map_err(|violations| {
        tracing::info!("Intake rejected: fields={:?}", violations.fields());
        violations
    })?;

    let reference = state.registry.submit_intake(&record).await.map_err(|e| {
        tracing::error!("Intake submission via {} failed: {}", state.registry.name(), e);
        e
    })?;

    tracing::info!(
        "Intake accepted via {} (matched guest: {})",
        state.registry.name(),
        record.guest_id.is_some()
    );

    Ok(HttpResponse::Ok().json(IntakeResult::accepted(reference)))
}
