#[cfg(test)]
mod client_tests {
    use crate::client::{extract_error_message, ApiError, BookingApi, BookingApiClient};
    use crate::client_mock::MockBookingApi;
    use crate::models::booking::DirectBookingRequest;
    use crate::tests::fixtures::{monday_morning, valid_details};

    #[test]
    fn test_base_url_is_trimmed() {
        let client = BookingApiClient::with_base_url("https://example.com/".to_string());
        assert_eq!(client.base_url(), "https://example.com");

        let client = BookingApiClient::with_base_url("https://example.com".to_string());
        assert_eq!(client.base_url(), "https://example.com");
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"message": "Slot already taken"}"#),
            Some("Slot already taken".to_string())
        );
        // Non-string message, missing field, or non-JSON body all yield None
        assert_eq!(extract_error_message(r#"{"message": 42}"#), None);
        assert_eq!(extract_error_message(r#"{"error": "nope"}"#), None);
        assert_eq!(extract_error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_error_message(""), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "booking API request failed: connection refused"
        );

        let err = ApiError::Status {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "booking API returned status 502");
    }

    #[tokio::test]
    async fn test_mock_fetch_availability() {
        let mut mock = MockBookingApi::new();
        mock.expect_fetch_availability()
            .withf(|user_id: &str| user_id == "pharmacist-7")
            .returning(|_| Ok(monday_morning()));

        let windows = mock.fetch_availability("pharmacist-7").await.unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].day_of_week, 0);
        assert_eq!(windows[0].start_time, "09:00");
    }

    #[tokio::test]
    async fn test_mock_create_booking_sees_full_payload() {
        let mut mock = MockBookingApi::new();
        mock.expect_create_booking()
            .withf(|request: &DirectBookingRequest| {
                request.pharmacist_id == "pharmacist-7"
                    && request.appointment_date == "2026-08-31"
                    && request.appointment_time == "10:00"
                    && request.details.referrer_name == "Dr Sam Harper"
            })
            .returning(|_| Ok(()));

        let request = DirectBookingRequest {
            pharmacist_id: "pharmacist-7".to_string(),
            appointment_date: "2026-08-31".to_string(),
            appointment_time: "10:00".to_string(),
            details: valid_details(),
        };
        assert!(mock.create_booking(&request).await.is_ok());
    }
}
