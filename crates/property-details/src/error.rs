use crate::config::ConfigError;
use crate::property::{PropertyError, UpstreamError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Upstream(UpstreamError),
    Property(PropertyError),
    BadRequest(&'static str),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "serialization error: {}", err),
            AppError::Upstream(err) => write!(f, "upstream setup error: {}", err),
            AppError::Property(err) => write!(f, "error getting property info: {}", err),
            AppError::BadRequest(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Upstream(err) => Some(err),
            AppError::Property(err) => Some(err),
            AppError::BadRequest(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Upstream(_)
            | AppError::Property(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<UpstreamError> for AppError {
    fn from(value: UpstreamError) -> Self {
        Self::Upstream(value)
    }
}

impl From<PropertyError> for AppError {
    fn from(value: PropertyError) -> Self {
        Self::Property(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::AddressError;

    #[test]
    fn missing_parameter_maps_to_bad_request() {
        let response = AppError::BadRequest("address parameter is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn failed_validation_is_a_lookup_failure() {
        let response =
            AppError::from(PropertyError::InvalidAddress(AddressError::Malformed)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn downstream_failures_map_to_internal_error() {
        let err = PropertyError::Geocoding(crate::property::GeocodeError::NotFound);
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn property_errors_carry_stage_context() {
        let err = AppError::from(PropertyError::InvalidAddress(AddressError::Empty));
        assert_eq!(
            err.to_string(),
            "error getting property info: address validation failed: address cannot be empty"
        );
    }
}
