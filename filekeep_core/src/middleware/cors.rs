//! CORS (Cross-Origin Resource Sharing) middleware configuration

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer as TowerCorsLayer};

pub fn cors_layer() -> TowerCorsLayer {
    TowerCorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}
