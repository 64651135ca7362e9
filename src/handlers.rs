use crate::errors::{AppError, RENDER_FALLBACK};
use crate::events::HostEvent;
use crate::heatmap::{build_heatmap, today};
use crate::metrics::MetricSettings;
use crate::models::{CurrentDayRequest, HeatmapResponse, SettingsPayload};
use crate::session::FetchOutcome;
use crate::state::{AppState, HostView};
use crate::ui::{render_fallback, render_index};
use crate::window::{DateWindow, PageDirection};
use axum::{
    Json,
    extract::State,
    response::{Html, Redirect},
};
use tracing::{error, info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let host = state.host_view();
    match load_heatmap(&state).await {
        Ok(heatmap) => Html(render_index(&heatmap, &host)),
        Err(err) => {
            warn!("rendering fallback page: {err}");
            Html(render_fallback(&host))
        }
    }
}

pub async fn get_heatmap(State(state): State<AppState>) -> Result<Json<HeatmapResponse>, AppError> {
    Ok(Json(load_heatmap(&state).await?))
}

pub async fn get_window(State(state): State<AppState>) -> Json<DateWindow> {
    Json(state.session.lock().await.window())
}

pub async fn page_prev(State(state): State<AppState>) -> Json<DateWindow> {
    Json(state.session.lock().await.page(PageDirection::Backward))
}

pub async fn page_next(State(state): State<AppState>) -> Json<DateWindow> {
    Json(state.session.lock().await.page(PageDirection::Forward))
}

pub async fn page_prev_form(State(state): State<AppState>) -> Redirect {
    state.session.lock().await.page(PageDirection::Backward);
    Redirect::to("/")
}

pub async fn page_next_form(State(state): State<AppState>) -> Redirect {
    state.session.lock().await.page(PageDirection::Forward);
    Redirect::to("/")
}

pub async fn set_current_day(
    State(state): State<AppState>,
    Json(payload): Json<CurrentDayRequest>,
) -> Json<CurrentDayRequest> {
    *state.current_day.lock().await = payload.date;
    info!(current_day = ?payload.date, "current journal day changed");
    Json(payload)
}

pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsPayload> {
    let settings = state.settings.lock().await;
    Json(SettingsPayload {
        properties: settings.metric_keys.join(","),
        display_names: settings.display_names.join(","),
    })
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsPayload>,
) -> Json<SettingsPayload> {
    let settings = MetricSettings::from_lists(&payload.properties, &payload.display_names);
    info!(metrics = ?settings.metric_keys, "metric settings updated");
    let response = SettingsPayload {
        properties: settings.metric_keys.join(","),
        display_names: settings.display_names.join(","),
    };
    *state.settings.lock().await = settings;
    Json(response)
}

pub async fn host_event(
    State(state): State<AppState>,
    Json(event): Json<HostEvent>,
) -> Json<HostView> {
    state.events.publish(&event);
    Json(state.host_view())
}

/// Fetch raw records for the active window, apply them to the session, and
/// build the heatmap from whatever the session then holds for that window.
async fn load_heatmap(state: &AppState) -> Result<HeatmapResponse, AppError> {
    let token = state.session.lock().await.begin_fetch();
    let (start_key, end_key) = token.window().day_keys();

    let records = state.store.query(start_key, end_key).await.map_err(|err| {
        error!(start_key, end_key, "journal query failed: {err}");
        AppError::unavailable(RENDER_FALLBACK)
    })?;

    let snapshot = {
        let mut session = state.session.lock().await;
        match session.apply(token, records) {
            FetchOutcome::Applied => {}
            FetchOutcome::Stale => info!("window changed while loading, keeping newer data"),
            FetchOutcome::Inactive => return Err(AppError::conflict("heatmap is not visible")),
        }
        session.snapshot().cloned()
    };
    let Some(snapshot) = snapshot else {
        return Err(AppError::conflict("window changed while loading"));
    };

    let current_day = *state.current_day.lock().await;
    let settings = state.settings.lock().await.clone();
    Ok(build_heatmap(&snapshot, &settings, current_day, today()))
}
