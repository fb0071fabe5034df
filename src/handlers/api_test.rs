#[cfg(test)]
mod api_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::{TestServer, TestServerConfig};
    use serde_json::{json, Value};

    use crate::client::{ApiError, BookingApi};
    use crate::client_mock::StubBookingApi;
    use crate::handlers::api::AppState;
    use crate::routes::create_router;
    use crate::services::clock::FixedClock;
    use crate::services::session::SessionStore;
    use crate::services::slots::DEFAULT_SLOT_MINUTES;
    use crate::tests::fixtures::{monday_morning, today, valid_details};

    // Helper function to set up a test server around a stub booking API
    fn setup_test_server(api: Arc<dyn BookingApi>) -> TestServer {
        let sessions = Arc::new(SessionStore::new(
            Arc::new(FixedClock(today())),
            DEFAULT_SLOT_MINUTES,
        ));
        let app_state = Arc::new(AppState { api, sessions });
        let router = create_router(app_state);

        let config = TestServerConfig::builder().mock_transport().build();
        TestServer::new_with_config(router, config).unwrap()
    }

    async fn create_session(server: &TestServer) -> String {
        let response = server
            .post("/api/widget/sessions")
            .json(&json!({"providerId": "pharmacist-7"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["step"], "date");
        body["sessionToken"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(Vec::new())));
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_create_session_fetches_availability() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(monday_morning())));
        let token = create_session(&server).await;
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_create_session_surfaces_fetch_failure() {
        let api = Arc::new(StubBookingApi::new(Vec::new()).with_fetch_failure());
        let server = setup_test_server(api);

        let response = server
            .post("/api/widget/sessions")
            .json(&json!({"providerId": "pharmacist-7"}))
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        assert!(response.text().contains("Failed to load availability"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(Vec::new())));
        let response = server.get("/api/widget/sessions/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_days_endpoint_flags_availability_and_past() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(monday_morning())));
        let token = create_session(&server).await;

        // A fortnight starting the Monday before the fixed "today"
        let response = server
            .get(&format!("/api/widget/sessions/{}/days", token))
            .add_query_param("start", "2026-08-17")
            .add_query_param("count", "14")
            .await;
        response.assert_status_ok();
        let days: Value = response.json();
        let days = days.as_array().unwrap();
        assert_eq!(days.len(), 14);

        // 2026-08-17: a Monday (open window) but in the past
        assert_eq!(days[0]["available"], true);
        assert_eq!(days[0]["past"], true);
        // 2026-08-24 is the fixed "today": open and not past
        assert_eq!(days[7]["available"], true);
        assert_eq!(days[7]["past"], false);
        // 2026-08-25, a Tuesday: no window
        assert_eq!(days[8]["available"], false);
    }

    #[tokio::test]
    async fn test_select_date_advances_and_returns_slots() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(monday_morning())));
        let token = create_session(&server).await;

        let response = server
            .post(&format!("/api/widget/sessions/{}/date", token))
            .json(&json!({"date": "2026-08-31"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["step"], "time");
        assert_eq!(body["selectedDate"], "2026-08-31");
        let slots: Vec<&str> = body["slots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|slot| slot["time"].as_str().unwrap())
            .collect();
        assert_eq!(slots, vec!["09:00", "10:00", "11:00"]);
    }

    #[tokio::test]
    async fn test_select_unavailable_date_is_noop() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(monday_morning())));
        let token = create_session(&server).await;

        // A Tuesday: no window, the widget must not advance
        let response = server
            .post(&format!("/api/widget/sessions/{}/date", token))
            .json(&json!({"date": "2026-09-01"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["step"], "date");
        assert_eq!(body["selectedDate"], Value::Null);
    }

    #[tokio::test]
    async fn test_submit_validation_errors_are_422() {
        let api = Arc::new(StubBookingApi::new(monday_morning()));
        let server = setup_test_server(Arc::clone(&api) as Arc<dyn BookingApi>);
        let token = create_session(&server).await;

        server
            .post(&format!("/api/widget/sessions/{}/date", token))
            .json(&json!({"date": "2026-08-31"}))
            .await;
        server
            .post(&format!("/api/widget/sessions/{}/time", token))
            .json(&json!({"time": "10:00"}))
            .await;

        let mut details = valid_details();
        details.patient_first_name = "".to_string();
        let response = server
            .post(&format!("/api/widget/sessions/{}/submit", token))
            .json(&details)
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["field"], "patientFirstName");

        // Rejected locally: the stub never saw a booking
        assert_eq!(api.booking_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_before_details_step_is_conflict() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(monday_morning())));
        let token = create_session(&server).await;

        let response = server
            .post(&format!("/api/widget/sessions/{}/submit", token))
            .json(&valid_details())
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_details_step_with_banner() {
        let api = Arc::new(StubBookingApi::new(monday_morning()).with_booking_error(
            ApiError::Status {
                status: 409,
                message: Some("Slot already taken".to_string()),
            },
        ));
        let server = setup_test_server(Arc::clone(&api) as Arc<dyn BookingApi>);
        let token = create_session(&server).await;

        server
            .post(&format!("/api/widget/sessions/{}/date", token))
            .json(&json!({"date": "2026-08-31"}))
            .await;
        server
            .post(&format!("/api/widget/sessions/{}/time", token))
            .json(&json!({"time": "10:00"}))
            .await;

        let response = server
            .post(&format!("/api/widget/sessions/{}/submit", token))
            .json(&valid_details())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Slot already taken");
        assert_eq!(body["step"], "details");

        // Selection survives for a retry
        let state: Value = server
            .get(&format!("/api/widget/sessions/{}", token))
            .await
            .json();
        assert_eq!(state["step"], "details");
        assert_eq!(state["selectedDate"], "2026-08-31");
        assert_eq!(state["selectedTime"], "10:00");
        assert_eq!(state["error"], "Slot already taken");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let server = setup_test_server(Arc::new(StubBookingApi::new(monday_morning())));
        let token = create_session(&server).await;

        let response = server
            .delete(&format!("/api/widget/sessions/{}", token))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(&format!("/api/widget/sessions/{}", token)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
