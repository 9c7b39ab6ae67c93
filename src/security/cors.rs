use axum::http::{header, HeaderValue, Method};
use log::{info, warn};
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means every origin is accepted.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<Method>,
    pub allowed_headers: Vec<header::HeaderName>,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ],
            allowed_headers: vec![header::CONTENT_TYPE, header::ACCEPT],
            max_age_secs: 3600,
        }
    }
}

impl CorsConfig {
    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn build(self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring unparsable CORS origin {o:?}");
                    None
                }
            })
            .collect();

        let cors = if origins.is_empty() {
            // Wildcard origins cannot be combined with credentials.
            CorsLayer::new().allow_origin(AllowOrigin::any())
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_credentials(true)
        };

        cors.allow_methods(self.allowed_methods)
            .allow_headers(self.allowed_headers)
            .max_age(std::time::Duration::from_secs(self.max_age_secs))
    }
}

pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        info!("CORS: allowing any origin");
    } else {
        info!("CORS configured with {} allowed origins", allowed_origins.len());
    }
    CorsConfig::default()
        .with_origins(allowed_origins.to_vec())
        .build()
}
