//! Booking Widget Service
//!
//! Engine behind an appointment-scheduling widget: it turns a provider's
//! weekly recurring availability into bookable time slots for a concrete
//! date, drives the date -> time -> details -> success selection flow,
//! and submits validated bookings to the external booking endpoint.
//!
//! # Modules
//!
//! - `client`: BookingApi trait and the reqwest client for the external
//!   availability and direct-booking endpoints
//! - `services::slots`: slot derivation and the date availability check
//! - `services::flow`: the booking step state machine
//! - `services::booking`: details validation and the single-flight submitter
//! - `services::session`: in-memory widget session store
//! - `handlers` / `routes`: the axum surface driving sessions over HTTP

pub mod client;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
pub mod client_mock;

// Re-export the main types for ease of use
pub use client::{ApiError, BookingApi, BookingApiClient};
pub use handlers::api::AppState;
pub use routes::create_router;
pub use services::flow::{BookingFlowController, BookingStep};
