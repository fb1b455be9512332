use crate::errors::ApiError;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue, RETRY_AFTER};
use actix_web::middleware::Next;
use actix_web::{web, Error, ResponseError};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Window count above which expired entries are swept on the next check
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of counting one request against its client's window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// Fixed-window request counter keyed by client address
///
/// A window starts with a client's first request and is replaced once it
/// has run its length. Once the map grows past `SWEEP_THRESHOLD`, expired
/// windows are swept at most once per window length.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<Windows>,
}

#[derive(Default)]
struct Windows {
    by_client: HashMap<String, Window>,
    last_sweep: Option<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(Windows::default()),
        }
    }

    /// Count a request from `key` now
    pub async fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    pub(crate) async fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut state = self.state.lock().await;
        let window = self.window;

        let sweep_due = state
            .last_sweep
            .map_or(true, |last| now.duration_since(last) >= window);
        if state.by_client.len() > SWEEP_THRESHOLD && sweep_due {
            state.by_client.retain(|_, w| now.duration_since(w.started) < window);
            state.last_sweep = Some(now);
        }

        let entry = state.by_client.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        entry.count = entry.count.saturating_add(1);
        let reset_after = self.window.saturating_sub(now.duration_since(entry.started));

        Decision {
            allowed: entry.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_after,
        }
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.state.lock().await.by_client.len()
    }
}

/// Middleware applying the shared `RateLimiter` to every request it wraps
///
/// Adds `RateLimit-*` headers to each response and answers 429 with
/// `Retry-After` once a client exhausts its window.
pub async fn enforce_rate_limit<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let Some(limiter) = req.app_data::<web::Data<RateLimiter>>().cloned() else {
        return Ok(next.call(req).await?.map_into_left_body());
    };

    let client = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let decision = limiter.check(&client).await;

    let mut res = if decision.allowed {
        next.call(req).await?.map_into_left_body()
    } else {
        tracing::warn!("Rate limit exceeded for {} on {}", client, req.path());
        let response = ApiError::RateLimited.error_response();
        let mut res = req.into_response(response).map_into_right_body::<B>();
        res.headers_mut().insert(RETRY_AFTER, HeaderValue::from(reset_secs(&decision)));
        res
    };

    let headers = res.headers_mut();
    headers.insert(
        HeaderName::from_static("ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static("ratelimit-reset"),
        HeaderValue::from(reset_secs(&decision)),
    );

    Ok(res)
}

fn reset_secs(decision: &Decision) -> u64 {
    let secs = decision.reset_after.as_secs();
    if decision.reset_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
