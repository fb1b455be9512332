// Route exports
pub mod assets;
pub mod intake;

use actix_web::{middleware::from_fn, web};
use crate::middleware::enforce_rate_limit;

pub use intake::AppState;

/// Register the rate-limited API scope and the single-page application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(from_fn(enforce_rate_limit))
            .configure(intake::configure)
            .default_service(web::to(assets::api_not_found)),
    )
    .configure(assets::configure);
}
