use crate::models::{GuestMatch, IntakeRequest, IntakeResult, LookupRequest, LookupResponse};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors a wizard sees when calling the intake API
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error. Try again.")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// The two intake API calls the wizard makes
#[async_trait]
pub trait IntakeApi: Send + Sync {
    async fn lookup(&self, req: &LookupRequest) -> Result<Vec<GuestMatch>, ClientError>;

    async fn intake(&self, req: &IntakeRequest) -> Result<IntakeResult, ClientError>;
}

/// Intake API over HTTP
pub struct HttpIntakeApi {
    base_url: String,
    client: Client,
}

impl HttpIntakeApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B, action: &str) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Network)?;

        if !response.status().is_success() {
            return Err(rejection(response, action).await);
        }

        response.json::<T>().await.map_err(ClientError::Network)
    }
}

#[async_trait]
impl IntakeApi for HttpIntakeApi {
    async fn lookup(&self, req: &LookupRequest) -> Result<Vec<GuestMatch>, ClientError> {
        let body: LookupResponse = self.post("/api/lookup", req, "Lookup").await?;
        Ok(body.matches)
    }

    async fn intake(&self, req: &IntakeRequest) -> Result<IntakeResult, ClientError> {
        self.post("/api/intake", req, "Submission").await
    }
}

/// Use the server's `error` text when it sent one
async fn rejection(response: Response, action: &str) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("{} failed ({}).", action, status));

    ClientError::Rejected { status, message }
}
