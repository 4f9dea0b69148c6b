//! HTTP surface: upload UI, GitHub endpoints, health and metrics

pub mod handlers;
pub mod integration;
pub mod render;
pub mod routes;

pub use handlers::AppState;
pub use integration::{build_app, init_app_state, init_webhook_state};
pub use render::{AlertLevel, PageRenderer};
pub use routes::build_router;
