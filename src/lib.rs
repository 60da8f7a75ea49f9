use std::sync::Arc;

use axum::Router;
use axum_extra::routing::RouterExt;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod github;
mod routes;

pub use config::Settings;

pub fn create_root_app(state: AppState) -> Router {
    Router::new()
        .typed_get(routes::download::download_handler)
        .typed_get(routes::data::data_handler)
        .typed_get(routes::health::health_handler)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    pub fn from_env() -> Result<Self, String> {
        Settings::from_env().map(Self::new)
    }
}
