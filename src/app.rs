use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/window/prev", post(handlers::page_prev_form))
        .route("/window/next", post(handlers::page_next_form))
        .route("/api/heatmap", get(handlers::get_heatmap))
        .route("/api/window", get(handlers::get_window))
        .route("/api/window/prev", post(handlers::page_prev))
        .route("/api/window/next", post(handlers::page_next))
        .route("/api/current-day", put(handlers::set_current_day))
        .route("/api/settings", get(handlers::get_settings).put(handlers::put_settings))
        .route("/api/host-events", post(handlers::host_event))
        .with_state(state)
}
