use actix_web::{web, App, HttpServer, middleware};
use pats_peak_intake::config::Settings;
use pats_peak_intake::errors::handle_json_payload_error;
use pats_peak_intake::middleware::{cors, default_headers, RateLimiter};
use pats_peak_intake::routes::{self, AppState};
use pats_peak_intake::services::build_registry;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting Pats Peak intake service...");

    // Select the registry once; handlers never re-check mock mode
    let registry = build_registry(&settings).map_err(|e| {
        error!("Failed to initialize upstream registry: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    if settings.upstream.mock_mode {
        info!("MOCK_MODE enabled: upstream calls are simulated");
    } else {
        info!(
            "Upstream registry configured (timeout: {}s)",
            settings.upstream.timeout_secs
        );
    }

    let app_state = AppState::new(registry);
    let limiter = web::Data::new(RateLimiter::new(
        settings.security.rate_limit_max,
        Duration::from_secs(settings.security.rate_limit_window_secs),
    ));
    let security = settings.security.clone();

    let origins = security.origins();
    if origins.is_empty() {
        info!("CORS: any origin allowed");
    } else {
        info!("CORS: {} allowed origins", origins.len());
    }

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting HTTP server on {}:{}", host, port);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(limiter.clone())
            .app_data(
                web::JsonConfig::default()
                    .limit(security.body_limit_bytes)
                    .error_handler(handle_json_payload_error),
            )
            .wrap(cors(&security))
            .wrap(default_headers())
            .wrap(middleware::Logger::default())
            .configure(routes::configure_routes)
    });

    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server.bind((host, port))?.run().await
}
