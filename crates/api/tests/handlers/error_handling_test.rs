use axum::{http::StatusCode, response::IntoResponse};
use rstest::rstest;
use vitalog_api::middleware::error_handling::AppError;
use vitalog_core::errors::HealthError;

#[rstest]
#[case(HealthError::NotFound("reminder".to_string()), StatusCode::NOT_FOUND)]
#[case(HealthError::Validation("time".to_string()), StatusCode::BAD_REQUEST)]
#[case(HealthError::Protocol("prefix".to_string()), StatusCode::BAD_REQUEST)]
#[case(HealthError::Data("row".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(HealthError::Delivery("smtp".to_string()), StatusCode::BAD_GATEWAY)]
#[case(HealthError::Database(eyre::eyre!("down")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: HealthError, #[case] expected: StatusCode) {
    let response = AppError(error).into_response();

    assert_eq!(response.status(), expected);
}

#[test]
fn test_eyre_report_maps_to_server_error() {
    let error: AppError = eyre::eyre!("pool timed out").into();

    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
