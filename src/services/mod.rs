// Service exports
pub mod mock;
pub mod upstream;

pub use mock::MockRegistry;
pub use upstream::{UpstreamClient, UpstreamEndpoints, UpstreamError, INTAKE_SOURCE};

use crate::config::Settings;
use crate::models::{GuestMatch, GuestQuery, IntakeRecord};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Guest registry capability used by the intake endpoints
#[async_trait]
pub trait GuestRegistry: Send + Sync {
    /// Search for existing guests matching the lookup criteria
    async fn search_guests(&self, query: &GuestQuery) -> Result<Vec<GuestMatch>, UpstreamError>;

    /// Submit a completed intake; returns the upstream reference, if any
    async fn submit_intake(&self, record: &IntakeRecord) -> Result<Option<String>, UpstreamError>;

    fn name(&self) -> &'static str;
}

/// Select the registry implementation once, at startup
pub fn build_registry(settings: &Settings) -> Result<Arc<dyn GuestRegistry>, UpstreamError> {
    if settings.upstream.mock_mode {
        return Ok(Arc::new(MockRegistry::new()));
    }

    let client = UpstreamClient::new(UpstreamEndpoints {
        search_url: settings.upstream.search_url.clone(),
        intake_url: settings.upstream.intake_url.clone(),
        api_key: settings.upstream.api_key.clone(),
        site_label: settings.site.label.clone(),
        timeout: Duration::from_secs(settings.upstream.timeout_secs),
    })?;

    Ok(Arc::new(client))
}
