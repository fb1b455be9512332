use actix_web::http::{header, Method};
use actix_web::{web, HttpRequest, HttpResponse};
use crate::errors::ApiError;

const INDEX_HTML: &str = include_str!("../../public/index.html");
const APP_JS: &str = include_str!("../../public/app.js");
const STYLES_CSS: &str = include_str!("../../public/styles.css");

/// Configure the embedded single-page application
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/app.js", web::get().to(app_js))
        .route("/styles.css", web::get().to(styles_css))
        .default_service(web::to(spa_fallback));
}

async fn app_js() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(APP_JS)
}

async fn styles_css() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(STYLES_CSS)
}

/// Any other GET serves the application shell so client-side routes resolve
async fn spa_fallback(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Err(ApiError::NotFound);
    }
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .body(INDEX_HTML))
}

/// Unknown API routes answer with JSON rather than the shell
pub async fn api_not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}
