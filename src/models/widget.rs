use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::availability::TimeSlot;
use crate::models::booking::FieldError;
use crate::services::flow::BookingStep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub provider_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SelectTimeRequest {
    pub time: String,
}

// Query parameters for the date-picker enablement endpoint
#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub start: NaiveDate,
    #[serde(default = "default_day_count")]
    pub count: usize,
}

pub fn default_day_count() -> usize {
    28
}

/// One date-picker entry: whether the date has any open window at all,
/// and whether it is in the past relative to the widget's clock.
#[derive(Debug, Serialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub available: bool,
    pub past: bool,
}

/// Snapshot of one widget session, returned after every transition so the
/// embedding UI can render without tracking state itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetStateResponse {
    pub session_token: String,
    pub step: BookingStep,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub slots: Vec<TimeSlot>,
    pub error: Option<String>,
    pub submitting: bool,
}

// Response body for the submit endpoint
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub step: BookingStep,
}

// 422 body carrying inline validation failures
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}
