use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Patient and referrer details collected at the details step.
///
/// Required fields are enforced by `services::booking::validate_details`
/// before any network call is made, never server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailsForm {
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_email: Option<String>,
    pub referrer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_clinic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request body for `POST /api/booking/direct`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectBookingRequest {
    pub pharmacist_id: String,
    /// Calendar date formatted as `YYYY-MM-DD`.
    pub appointment_date: String,
    /// Wall-clock time formatted as `HH:MM`.
    pub appointment_time: String,
    #[serde(flatten)]
    pub details: BookingDetailsForm,
}

/// The date/time pair the visitor has picked so far. `time` is only ever
/// set while `date` is set; the flow controller owns all mutation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingSelection {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

// A single field-level validation failure, surfaced inline in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The booking endpoint accepted the request (any 2xx; body ignored).
    Accepted,
    /// Local validation failed; no network call was made.
    Rejected(Vec<FieldError>),
    /// The booking endpoint rejected the request or was unreachable.
    /// Carries the server's `message` verbatim when present, else a
    /// generic fallback.
    Failed(String),
    /// A submission is already pending for this widget instance.
    InFlight,
}
