use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::Client;
use serde_json::Value;
use std::env;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::availability::AvailabilityWindow;
use crate::models::booking::DirectBookingRequest;

/// Error from the external booking service.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No usable response: connection failure, timeout, malformed body.
    #[error("booking API request failed: {0}")]
    Network(String),
    /// Non-2xx response; `message` carries the body's `message` field
    /// when the body was JSON and had one.
    #[error("booking API returned status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// The two calls the widget core makes against the booking service.
/// Kept behind a trait so handlers and tests share one seam.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// `GET /api/booking/availability?userId=<id>`: the provider's full
    /// weekly recurring window set.
    async fn fetch_availability(&self, user_id: &str) -> Result<Vec<AvailabilityWindow>, ApiError>;

    /// `POST /api/booking/direct`: create the booking. Any 2xx is
    /// success and the body is ignored beyond that.
    async fn create_booking(&self, request: &DirectBookingRequest) -> Result<(), ApiError>;
}

/// HTTP client for the booking service. Requests carry credentials via a
/// cookie store so the visitor's existing session is reused.
pub struct BookingApiClient {
    client: Client,
    base_url: String,
}

impl BookingApiClient {
    /// Build a client from environment variables.
    pub fn new() -> Self {
        dotenv().ok();

        let base_url = env::var("BOOKING_API_BASE_URL")
            .expect("BOOKING_API_BASE_URL must be set in environment");

        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BookingApi for BookingApiClient {
    async fn fetch_availability(&self, user_id: &str) -> Result<Vec<AvailabilityWindow>, ApiError> {
        let url = format!("{}/api/booking/availability", self.base_url);

        info!("Fetching availability for provider {}", user_id);
        debug!("API URL: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Availability fetch returned status {}", status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: None,
            });
        }

        let windows = response.json::<Vec<AvailabilityWindow>>().await?;
        info!("Fetched {} availability windows", windows.len());
        Ok(windows)
    }

    async fn create_booking(&self, request: &DirectBookingRequest) -> Result<(), ApiError> {
        let url = format!("{}/api/booking/direct", self.base_url);

        info!(
            "Creating booking with provider {} for {} {}",
            request.pharmacist_id, request.appointment_date, request.appointment_time
        );
        debug!("API URL: {}", url);

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if status.is_success() {
            info!("Booking created (status {})", status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Booking creation returned status {}: {}", status, body);
        Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }
}

/// Pull the `message` string out of a JSON error body, if there is one.
pub fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(|message| message.to_string())
}
