use axum::{
    extract::{Json as ExtractJson, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::BookingApi;
use crate::models::booking::{BookingDetailsForm, SubmissionOutcome};
use crate::models::widget::{
    CreateSessionRequest, DayEntry, DaysQuery, SelectDateRequest, SelectTimeRequest,
    SubmitResponse, ValidationErrorResponse, WidgetStateResponse,
};
use crate::services::booking::{validate_details, BookingSubmitter, AVAILABILITY_LOAD_ERROR};
use crate::services::session::{SessionStore, WidgetSession};

// AppState struct containing shared resources
pub struct AppState {
    pub api: Arc<dyn BookingApi>,
    pub sessions: Arc<SessionStore>,
}

// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

fn snapshot(token: &str, session: &WidgetSession) -> WidgetStateResponse {
    let controller = &session.controller;
    WidgetStateResponse {
        session_token: token.to_string(),
        step: controller.step(),
        selected_date: controller.selection().date,
        selected_time: controller.selection().time.clone(),
        slots: controller.available_slots(),
        error: controller.error().map(|message| message.to_string()),
        submitting: controller.is_submitting(),
    }
}

// Create a widget session: fetch the provider's availability once and
// hold it read-only for the session's lifetime
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<CreateSessionRequest>,
) -> Result<Json<WidgetStateResponse>, (StatusCode, String)> {
    info!(
        "Received request to create widget session for provider {}",
        request.provider_id
    );

    let windows = match state.api.fetch_availability(&request.provider_id).await {
        Ok(windows) => windows,
        Err(err) => {
            error!("Failed to load availability: {}", err);
            return Err((StatusCode::BAD_GATEWAY, AVAILABILITY_LOAD_ERROR.to_string()));
        }
    };

    let submitter = Arc::new(BookingSubmitter::new(Arc::clone(&state.api)));
    let token = state
        .sessions
        .create(&request.provider_id, windows, submitter);

    state
        .sessions
        .with_session(&token, |session| Json(snapshot(&token, session)))
        .ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session was lost before it could be returned".to_string(),
        ))
}

// Current session state endpoint
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<WidgetStateResponse>, StatusCode> {
    state
        .sessions
        .with_session(&token, |session| Json(snapshot(&token, session)))
        .ok_or(StatusCode::NOT_FOUND)
}

// Date-picker enablement: existence checks only, no slot lists
pub async fn list_days(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Query(params): Query<DaysQuery>,
) -> Result<Json<Vec<DayEntry>>, StatusCode> {
    let count = params.count.min(366);
    let today = state.sessions.clock().today();

    state
        .sessions
        .with_session(&token, |session| {
            let days = params
                .start
                .iter_days()
                .take(count)
                .map(|date| DayEntry {
                    date,
                    available: session.controller.has_availability(date),
                    past: date < today,
                })
                .collect::<Vec<_>>();
            Json(days)
        })
        .ok_or(StatusCode::NOT_FOUND)
}

// Select a date (Date -> Time); a failed precondition returns the
// unchanged state
pub async fn select_date(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ExtractJson(request): ExtractJson<SelectDateRequest>,
) -> Result<Json<WidgetStateResponse>, StatusCode> {
    state
        .sessions
        .with_session(&token, |session| {
            session.controller.select_date(request.date);
            Json(snapshot(&token, session))
        })
        .ok_or(StatusCode::NOT_FOUND)
}

// Select a time slot (Time -> Details)
pub async fn select_time(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ExtractJson(request): ExtractJson<SelectTimeRequest>,
) -> Result<Json<WidgetStateResponse>, StatusCode> {
    state
        .sessions
        .with_session(&token, |session| {
            session.controller.select_time(&request.time);
            Json(snapshot(&token, session))
        })
        .ok_or(StatusCode::NOT_FOUND)
}

// Step back one stage
pub async fn step_back(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<WidgetStateResponse>, StatusCode> {
    state
        .sessions
        .with_session(&token, |session| {
            session.controller.back();
            Json(snapshot(&token, session))
        })
        .ok_or(StatusCode::NOT_FOUND)
}

// Reset after a successful booking (Success -> Date)
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<WidgetStateResponse>, StatusCode> {
    state
        .sessions
        .with_session(&token, |session| {
            session.controller.reset();
            Json(snapshot(&token, session))
        })
        .ok_or(StatusCode::NOT_FOUND)
}

// Re-fetch availability for the session's provider. The fresh window set
// fully replaces the old one and a stale selected time is cleared.
pub async fn refresh_availability(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<WidgetStateResponse>, (StatusCode, String)> {
    // Claim the single fetch allowed in flight for this session
    let provider_id = state
        .sessions
        .with_session(&token, |session| {
            if session.loading {
                warn!("Availability refresh already in flight for session {}", token);
                return None;
            }
            session.loading = true;
            Some(session.provider_id.clone())
        })
        .ok_or((StatusCode::NOT_FOUND, "Unknown session".to_string()))?;

    let Some(provider_id) = provider_id else {
        // Duplicate refresh: report the current state without fetching
        return state
            .sessions
            .with_session(&token, |session| Json(snapshot(&token, session)))
            .ok_or((StatusCode::NOT_FOUND, "Unknown session".to_string()));
    };

    let fetched = state.api.fetch_availability(&provider_id).await;

    state
        .sessions
        .with_session(&token, |session| {
            session.loading = false;
            match fetched {
                Ok(windows) => {
                    session.controller.set_availability(windows);
                    Ok(Json(snapshot(&token, session)))
                }
                Err(err) => {
                    error!("Failed to refresh availability: {}", err);
                    Err((StatusCode::BAD_GATEWAY, AVAILABILITY_LOAD_ERROR.to_string()))
                }
            }
        })
        .ok_or((StatusCode::NOT_FOUND, "Unknown session".to_string()))?
}

// End a widget session
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> StatusCode {
    if state.sessions.remove(&token) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// Submit the details form: validate locally, then forward to the booking
// endpoint. Failures keep the session in the details step with a banner
// message so the visitor can retry without re-selecting date and time.
pub async fn submit_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ExtractJson(details): ExtractJson<BookingDetailsForm>,
) -> Result<Json<SubmitResponse>, SubmitError> {
    // Validate and claim the in-flight slot under the lock; the network
    // call happens after it is released
    let prepared = state
        .sessions
        .with_session(&token, |session| {
            let errors = validate_details(&details);
            if !errors.is_empty() {
                info!(
                    "Rejected booking submission locally with {} field errors",
                    errors.len()
                );
                return Err(SubmitError::Validation(errors));
            }

            if !session.controller.begin_submit() {
                warn!(
                    "Submission not allowed at step {:?} for session {}",
                    session.controller.step(),
                    token
                );
                return Err(SubmitError::NotAllowed);
            }

            let date = session.controller.selection().date;
            let time = session.controller.selection().time.clone();
            let (Some(date), Some(time)) = (date, time) else {
                // Details step always carries a date and time; release the
                // claimed flag if that invariant is ever broken
                session.controller.abort_submit();
                return Err(SubmitError::NotAllowed);
            };

            Ok((
                session.provider_id.clone(),
                Arc::clone(&session.submitter),
                date,
                time,
            ))
        })
        .ok_or(SubmitError::UnknownSession)??;

    let (provider_id, submitter, date, time) = prepared;
    let outcome = submitter.submit(&provider_id, date, &time, &details).await;

    let response = state
        .sessions
        .with_session(&token, |session| match outcome {
            SubmissionOutcome::Accepted => {
                session.controller.resolve_submit(Ok(()));
                SubmitResponse {
                    success: true,
                    message: "Booking created successfully".to_string(),
                    step: session.controller.step(),
                }
            }
            SubmissionOutcome::Failed(ref message) => {
                session.controller.resolve_submit(Err(message.clone()));
                SubmitResponse {
                    success: false,
                    message: message.clone(),
                    step: session.controller.step(),
                }
            }
            SubmissionOutcome::Rejected(_) | SubmissionOutcome::InFlight => {
                // Can't happen: validation ran above and the controller
                // flag was claimed, but resolve defensively either way
                session.controller.abort_submit();
                SubmitResponse {
                    success: false,
                    message: "Submission was not attempted".to_string(),
                    step: session.controller.step(),
                }
            }
        })
        .ok_or(SubmitError::UnknownSession)?;

    Ok(Json(response))
}

/// Non-success results of the submit endpoint.
pub enum SubmitError {
    UnknownSession,
    NotAllowed,
    Validation(Vec<crate::models::booking::FieldError>),
}

impl axum::response::IntoResponse for SubmitError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SubmitError::UnknownSession => StatusCode::NOT_FOUND.into_response(),
            SubmitError::NotAllowed => StatusCode::CONFLICT.into_response(),
            SubmitError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response(),
        }
    }
}
