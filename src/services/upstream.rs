use crate::core::normalize::{normalize_results, scalar_string};
use crate::models::{GuestMatch, GuestQuery, IntakeRecord, SkierType};
use crate::services::GuestRegistry;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Tag identifying this integration on every intake record
pub const INTAKE_SOURCE: &str = "pats-peak-web";

/// Errors that can occur when talking to the upstream registry
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{message}")]
    ApiError { status: u16, message: String },

    #[error("Upstream not configured: {0}")]
    NotConfigured(String),
}

impl UpstreamError {
    /// HTTP status to report to our own caller
    ///
    /// Upstream error statuses pass through; anything without a usable
    /// status becomes 502.
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::ApiError { status, .. } if (400..600).contains(status) => *status,
            _ => StatusCode::BAD_GATEWAY.as_u16(),
        }
    }
}

/// Connection details for the upstream registry
#[derive(Debug, Clone)]
pub struct UpstreamEndpoints {
    pub search_url: String,
    pub intake_url: String,
    pub api_key: String,
    pub site_label: String,
    pub timeout: Duration,
}

/// HTTP client for the guest registry and intake service
///
/// Both calls are POSTs with a static bearer token so that identity fields
/// never appear in URLs. Calls are bounded by the client timeout and never
/// retried.
pub struct UpstreamClient {
    endpoints: UpstreamEndpoints,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    first_name: &'a str,
    last_name: &'a str,
    dob: &'a str,
    zip: &'a str,
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct IntakePayload<'a> {
    guest_id: Option<&'a str>,
    first_name: &'a str,
    last_name: &'a str,
    dob: &'a str,
    zip: &'a str,
    phone: &'a str,
    skier_type: SkierType,
    weight_lbs: f64,
    height_in: f64,
    shoe_size_us: f64,
    email: &'a str,
    source: &'a str,
    site: &'a str,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(endpoints: UpstreamEndpoints) -> Result<Self, UpstreamError> {
        if endpoints.search_url.trim().is_empty() || endpoints.intake_url.trim().is_empty() {
            return Err(UpstreamError::NotConfigured(
                "search and intake URLs are required outside mock mode".into(),
            ));
        }

        let client = Client::builder().timeout(endpoints.timeout).build()?;

        Ok(Self { endpoints, client })
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> Result<Value, UpstreamError> {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.endpoints.api_key)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        // A success body that is not JSON carries no usable data
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl GuestRegistry for UpstreamClient {
    async fn search_guests(&self, query: &GuestQuery) -> Result<Vec<GuestMatch>, UpstreamError> {
        let payload = SearchPayload {
            first_name: &query.first_name,
            last_name: &query.last_name,
            dob: &query.dob,
            zip: &query.zip,
            phone: &query.phone,
        };

        let body = self.post(&self.endpoints.search_url, &payload).await?;
        let matches = normalize_results(&body);

        tracing::debug!("Registry search returned {} matches", matches.len());

        Ok(matches)
    }

    async fn submit_intake(&self, record: &IntakeRecord) -> Result<Option<String>, UpstreamError> {
        let payload = IntakePayload {
            guest_id: record.guest_id.as_deref().filter(|id| !id.is_empty()),
            first_name: &record.guest.first_name,
            last_name: &record.guest.last_name,
            dob: &record.guest.dob,
            zip: &record.guest.zip,
            phone: &record.guest.phone,
            skier_type: record.skier_type,
            weight_lbs: record.weight_lbs,
            height_in: record.height_in,
            shoe_size_us: record.shoe_size,
            email: &record.email,
            source: INTAKE_SOURCE,
            site: &self.endpoints.site_label,
        };

        let body = self.post(&self.endpoints.intake_url, &payload).await?;
        let reference = body.get("id").and_then(scalar_string);

        tracing::debug!("Intake accepted upstream (ref present: {})", reference.is_some());

        Ok(reference)
    }

    fn name(&self) -> &'static str {
        "upstream"
    }
}

/// Build the error for a non-2xx upstream response
///
/// Prefers the upstream's own `error` string; falls back to the status.
async fn api_error(response: Response) -> UpstreamError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| json.get("error").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    tracing::warn!("Upstream responded {}: {}", status, message);

    UpstreamError::ApiError {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn query() -> GuestQuery {
        GuestQuery {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            dob: "1990-05-01".into(),
            zip: "03301".into(),
            phone: "603-555-0100".into(),
        }
    }

    fn record(guest_id: Option<&str>) -> IntakeRecord {
        IntakeRecord {
            guest_id: guest_id.map(str::to_string),
            guest: query(),
            skier_type: SkierType::Three,
            weight_lbs: 150.0,
            height_in: 66.0,
            shoe_size: 9.5,
            email: "ada@example.com".into(),
        }
    }

    fn client_for(server: &mockito::ServerGuard) -> UpstreamClient {
        UpstreamClient::new(UpstreamEndpoints {
            search_url: format!("{}/guests/search", server.url()),
            intake_url: format!("{}/intake", server.url()),
            api_key: "secret".into(),
            site_label: "PatsPeak".into(),
            timeout: Duration::from_secs(10),
        })
        .unwrap()
    }

    #[test]
    fn test_requires_urls() {
        let result = UpstreamClient::new(UpstreamEndpoints {
            search_url: String::new(),
            intake_url: "http://localhost/intake".into(),
            api_key: String::new(),
            site_label: "PatsPeak".into(),
            timeout: Duration::from_secs(10),
        });
        assert!(matches!(result, Err(UpstreamError::NotConfigured(_))));
    }

    #[test]
    fn test_status_code_mapping() {
        let err = UpstreamError::ApiError { status: 404, message: "gone".into() };
        assert_eq!(err.status_code(), 404);

        let err = UpstreamError::ApiError { status: 302, message: "moved".into() };
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_search_sends_snake_case_with_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/guests/search")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "dob": "1990-05-01",
                "zip": "03301",
                "phone": "603-555-0100"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results":[{"guest_id":"G-7","first_name":"Ada","last_name":"Lovelace"}]}"#)
            .create_async()
            .await;

        let matches = client_for(&server).search_guests(&query()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id.as_deref(), Some("G-7"));
        assert_eq!(matches[0].first_name, "Ada");
    }

    #[tokio::test]
    async fn test_search_unexpected_shape_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/guests/search")
            .with_status(200)
            .with_body("no results today")
            .create_async()
            .await;

        let matches = client_for(&server).search_guests(&query()).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_search_propagates_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/guests/search")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"registry offline"}"#)
            .create_async()
            .await;

        let err = client_for(&server).search_guests(&query()).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_string(), "registry offline");
    }

    #[tokio::test]
    async fn test_error_without_body_uses_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/intake")
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server).submit_intake(&record(None)).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_string(), "Request failed with status code 401");
    }

    #[tokio::test]
    async fn test_submit_intake_payload_and_reference() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/intake")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJson(json!({
                "guest_id": "G-1001",
                "skier_type": "III",
                "shoe_size_us": 9.5,
                "source": "pats-peak-web",
                "site": "PatsPeak"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"INT-55"}"#)
            .create_async()
            .await;

        let reference = client_for(&server).submit_intake(&record(Some("G-1001"))).await.unwrap();

        mock.assert_async().await;
        assert_eq!(reference.as_deref(), Some("INT-55"));
    }

    #[tokio::test]
    async fn test_submit_intake_new_guest_and_missing_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/intake")
            .match_body(Matcher::PartialJson(json!({ "guest_id": null })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let reference = client_for(&server).submit_intake(&record(None)).await.unwrap();
        assert_eq!(reference, None);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let client = UpstreamClient::new(UpstreamEndpoints {
            search_url: "http://127.0.0.1:9/search".into(),
            intake_url: "http://127.0.0.1:9/intake".into(),
            api_key: "secret".into(),
            site_label: "PatsPeak".into(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let err = client.search_guests(&query()).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }
}
