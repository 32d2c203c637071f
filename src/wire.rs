use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// JSON body an upstream service answers with when a request fails.
///
/// Missing fields decode to their zero values; only `code` drives mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ErrorResponse {
    /// Builds the payload a service sends for `error`, stamped with the current time.
    pub fn from_service_error(error: &ServiceError, message: impl Into<String>) -> Self {
        Self {
            code: error.code().to_owned(),
            message: message.into(),
            status: error.status(),
            timestamp: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ErrorResponse;
    use crate::ServiceError;

    #[test]
    fn decodes_rfc3339_timestamp() {
        let payload: ErrorResponse = serde_json::from_value(json!({
            "code": "NOT_FOUND",
            "message": "missing",
            "status": 404,
            "timestamp": "2024-03-01T12:30:00Z"
        }))
        .expect("payload must decode");

        assert_eq!(payload.code, "NOT_FOUND");
        assert_eq!(payload.status, 404);
        assert_eq!(
            payload.timestamp.map(|ts| ts.to_rfc3339()),
            Some("2024-03-01T12:30:00+00:00".to_owned())
        );
    }

    #[test]
    fn timestamp_is_optional() {
        let payload: ErrorResponse =
            serde_json::from_value(json!({"code": "X", "message": "m", "status": 400}))
                .expect("payload without timestamp must decode");
        assert!(payload.timestamp.is_none());
    }

    #[test]
    fn missing_fields_decode_to_zero_values() {
        let payload: ErrorResponse = serde_json::from_value(json!({"code": "NOT_FOUND"}))
            .expect("payload with only a code must decode");
        assert_eq!(payload.code, "NOT_FOUND");
        assert_eq!(payload.message, "");
        assert_eq!(payload.status, 0);
    }

    #[test]
    fn from_service_error_copies_code_and_status() {
        let payload = ErrorResponse::from_service_error(&ServiceError::BAD_REQUEST, "bad body");
        assert_eq!(payload.code, "BAD_REQUEST");
        assert_eq!(payload.status, 400);
        assert_eq!(payload.message, "bad body");
        assert!(payload.timestamp.is_some());
    }
}
