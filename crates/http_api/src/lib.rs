mod errors;
mod handlers;
mod state;

use axum::{Router, routing::post};

pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/fetch", post(handlers::fetch))
        .route("/stats", post(handlers::stats))
        .route("/records", post(handlers::records))
        .route("/bot_stats", post(handlers::bot_stats))
        .route("/config_get", post(handlers::config_get))
        .route("/config_put", post(handlers::config_put))
        .route("/auto_sync_status", post(handlers::auto_sync_status))
        .route("/points_info", post(handlers::points_info));

    Router::new().nest("/api", api).with_state(state)
}
