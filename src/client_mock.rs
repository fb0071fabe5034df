use async_trait::async_trait;
use mockall::mock;
use std::sync::Mutex;
use std::time::Duration;

use crate::client::{ApiError, BookingApi};
use crate::models::availability::AvailabilityWindow;
use crate::models::booking::DirectBookingRequest;

// Expectation-style mock of the booking API
mock! {
    pub BookingApi {}

    #[async_trait]
    impl BookingApi for BookingApi {
        async fn fetch_availability(
            &self,
            user_id: &str,
        ) -> Result<Vec<AvailabilityWindow>, ApiError>;

        async fn create_booking(
            &self,
            request: &DirectBookingRequest,
        ) -> Result<(), ApiError>;
    }
}

/// Seeded in-memory booking API for workflow tests: serves a fixed window
/// set, records every accepted booking, and can be told to fail either call.
pub struct StubBookingApi {
    windows: Vec<AvailabilityWindow>,
    bookings: Mutex<Vec<DirectBookingRequest>>,
    fail_fetch: bool,
    booking_error: Option<ApiError>,
    response_delay: Option<Duration>,
}

impl StubBookingApi {
    pub fn new(windows: Vec<AvailabilityWindow>) -> Self {
        Self {
            windows,
            bookings: Mutex::new(Vec::new()),
            fail_fetch: false,
            booking_error: None,
            response_delay: None,
        }
    }

    /// Make `fetch_availability` return a 500.
    pub fn with_fetch_failure(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Make `create_booking` fail with the given error.
    pub fn with_booking_error(mut self, error: ApiError) -> Self {
        self.booking_error = Some(error);
        self
    }

    /// Hold each `create_booking` call open for the given duration, to
    /// exercise the single-flight guard.
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = Some(delay);
        self
    }

    pub fn bookings(&self) -> Vec<DirectBookingRequest> {
        self.bookings.lock().unwrap().clone()
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.lock().unwrap().len()
    }
}

#[async_trait]
impl BookingApi for StubBookingApi {
    async fn fetch_availability(&self, _user_id: &str) -> Result<Vec<AvailabilityWindow>, ApiError> {
        if self.fail_fetch {
            return Err(ApiError::Status {
                status: 500,
                message: None,
            });
        }
        Ok(self.windows.clone())
    }

    async fn create_booking(&self, request: &DirectBookingRequest) -> Result<(), ApiError> {
        if let Some(delay) = self.response_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.booking_error {
            return Err(error.clone());
        }
        self.bookings.lock().unwrap().push(request.clone());
        Ok(())
    }
}
