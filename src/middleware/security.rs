use crate::config::SecuritySettings;
use actix_cors::Cors;
use actix_web::http::{header, Method};
use actix_web::middleware::DefaultHeaders;

/// Content security policy: self-origin only, no inline scripts, with
/// inline styles and data-URI images allowed
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    base-uri 'self'; \
    font-src 'self' https: data:; \
    form-action 'self'; \
    frame-ancestors 'self'; \
    img-src 'self' data:; \
    object-src 'none'; \
    script-src 'self'; \
    script-src-attr 'none'; \
    style-src 'self' 'unsafe-inline'; \
    upgrade-insecure-requests";

/// Restrictive response headers applied to every response
pub fn default_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add(("Origin-Agent-Cluster", "?1"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add((header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"))
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add(("X-DNS-Prefetch-Control", "off"))
        .add(("X-Download-Options", "noopen"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add(("X-Permitted-Cross-Domain-Policies", "none"))
        .add((header::X_XSS_PROTECTION, "0"))
}

/// Cross-origin policy: the configured allow-list, or any origin when none
/// is configured. Credentials are never allowed.
pub fn cors(settings: &SecuritySettings) -> Cors {
    let origins = settings.origins();

    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(600)
}
