use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::client::{ApiError, BookingApi};
use crate::models::booking::{
    BookingDetailsForm, DirectBookingRequest, FieldError, SubmissionOutcome,
};

/// Banner message shown when the booking endpoint fails without a usable
/// `message` in its error body, or cannot be reached at all.
pub const GENERIC_SUBMIT_ERROR: &str = "Failed to create booking. Please try again.";

/// Message shown when the initial availability fetch fails.
pub const AVAILABILITY_LOAD_ERROR: &str = "Failed to load availability. Please try again later.";

const MIN_PHONE_LENGTH: usize = 10;

// "local@domain.tld" shape: one '@', non-empty local part, and a domain
// with a non-empty label either side of a dot.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !name.ends_with('.') && !tld.is_empty(),
        None => false,
    }
}

/// Validate the details form locally. Every rule runs before any network
/// call; the server is never relied on to reject malformed shapes.
pub fn validate_details(details: &BookingDetailsForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if details.patient_first_name.trim().is_empty() {
        errors.push(FieldError {
            field: "patientFirstName",
            message: "First name is required".to_string(),
        });
    }
    if details.patient_last_name.trim().is_empty() {
        errors.push(FieldError {
            field: "patientLastName",
            message: "Last name is required".to_string(),
        });
    }
    if details.patient_phone.trim().len() < MIN_PHONE_LENGTH {
        errors.push(FieldError {
            field: "patientPhone",
            message: format!("Phone number must be at least {} characters", MIN_PHONE_LENGTH),
        });
    }
    if let Some(email) = details.patient_email.as_deref() {
        if !email.is_empty() && !is_valid_email(email) {
            errors.push(FieldError {
                field: "patientEmail",
                message: "Enter a valid email address".to_string(),
            });
        }
    }
    if details.referrer_name.trim().is_empty() {
        errors.push(FieldError {
            field: "referrerName",
            message: "Referrer name is required".to_string(),
        });
    }
    if let Some(email) = details.referrer_email.as_deref() {
        if !email.is_empty() && !is_valid_email(email) {
            errors.push(FieldError {
                field: "referrerEmail",
                message: "Enter a valid email address".to_string(),
            });
        }
    }

    errors
}

/// Builds and sends the create-booking request for one widget instance.
///
/// At most one submission may be in flight per instance: while one is
/// pending, further attempts resolve to `SubmissionOutcome::InFlight`
/// without touching the network.
pub struct BookingSubmitter {
    api: Arc<dyn BookingApi>,
    in_flight: AtomicBool,
}

impl BookingSubmitter {
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self {
            api,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Validate, serialize, and send one booking.
    ///
    /// Validation failures reject locally with per-field errors and no
    /// network call. Server failures surface the error body's `message`
    /// verbatim when present; everything else (no response, malformed
    /// body) normalizes to the generic fallback.
    pub async fn submit(
        &self,
        pharmacist_id: &str,
        date: NaiveDate,
        time: &str,
        details: &BookingDetailsForm,
    ) -> SubmissionOutcome {
        let errors = validate_details(details);
        if !errors.is_empty() {
            debug!("Booking details rejected locally: {} field errors", errors.len());
            return SubmissionOutcome::Rejected(errors);
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Submission already in flight; ignoring duplicate submit");
            return SubmissionOutcome::InFlight;
        }

        let request = DirectBookingRequest {
            pharmacist_id: pharmacist_id.to_string(),
            appointment_date: date.format("%Y-%m-%d").to_string(),
            appointment_time: time.to_string(),
            details: details.clone(),
        };

        info!(
            "Submitting booking for {} at {} with provider {}",
            request.appointment_date, request.appointment_time, pharmacist_id
        );

        let result = self.api.create_booking(&request).await;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => SubmissionOutcome::Accepted,
            Err(ApiError::Status {
                message: Some(message),
                status,
            }) => {
                error!("Booking rejected with status {}: {}", status, message);
                SubmissionOutcome::Failed(message)
            }
            Err(err) => {
                error!("Booking submission failed: {}", err);
                SubmissionOutcome::Failed(GENERIC_SUBMIT_ERROR.to_string())
            }
        }
    }
}
