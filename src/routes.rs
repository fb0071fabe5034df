use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::api::{
    create_session, delete_session, get_session, health_check, list_days, refresh_availability,
    reset_session, select_date, select_time, step_back, submit_booking, AppState,
};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let session_routes = Router::new()
        .route("/api/widget/sessions", post(create_session))
        .route(
            "/api/widget/sessions/:token",
            get(get_session).delete(delete_session),
        )
        .route("/api/widget/sessions/:token/days", get(list_days))
        .route("/api/widget/sessions/:token/date", post(select_date))
        .route("/api/widget/sessions/:token/time", post(select_time))
        .route("/api/widget/sessions/:token/back", post(step_back))
        .route("/api/widget/sessions/:token/reset", post(reset_session))
        .route(
            "/api/widget/sessions/:token/refresh",
            post(refresh_availability),
        )
        .route("/api/widget/sessions/:token/submit", post(submit_booking));

    Router::new()
        .route("/health", get(health_check))
        .merge(session_routes)
        .with_state(app_state)
}
