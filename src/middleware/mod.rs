// Cross-cutting request policies
pub mod rate_limit;
pub mod security;

pub use rate_limit::{enforce_rate_limit, Decision, RateLimiter};
pub use security::{cors, default_headers, CONTENT_SECURITY_POLICY};
