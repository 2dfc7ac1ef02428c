//! Request outcomes and the facade response envelope.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, ErrorKind};

/// Body the shadow endpoint answers with instead of JSON.
pub const SUCCESS_SENTINEL: &str = "success";

/// The payload of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// A decoded JSON body. Empty bodies decode to `null`.
    Json(Value),
    /// The bare success sentinel.
    Confirmed,
}

impl ResponsePayload {
    /// Decode a success response body.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the body is neither the sentinel nor JSON.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let trimmed = body.trim();
        if trimmed == SUCCESS_SENTINEL {
            return Ok(ResponsePayload::Confirmed);
        }
        if trimmed.is_empty() {
            return Ok(ResponsePayload::Json(Value::Null));
        }
        serde_json::from_str(trimmed).map(ResponsePayload::Json)
    }

    /// Returns the JSON value, if any.
    pub fn into_json(self) -> Option<Value> {
        match self {
            ResponsePayload::Json(value) => Some(value),
            ResponsePayload::Confirmed => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, ResponsePayload::Confirmed)
    }
}

/// What the device and user facades hand back to callers.
///
/// Validation failures are returned as `Err` before any request is made;
/// everything the pipeline reports is folded into this envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ApiResponse {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data: data.filter(|value| !value.is_null()),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            error_kind: err.kind(),
        }
    }

    /// Fold a pipeline outcome into a response.
    pub fn from_outcome(outcome: Result<ResponsePayload, Error>) -> Self {
        match outcome {
            Ok(payload) => Self::ok(payload.into_json()),
            Err(err) => Self::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CloudError, RequestError};
    use serde_json::json;

    #[test]
    fn sentinel_body_is_confirmed() {
        assert_eq!(
            ResponsePayload::from_body("success").unwrap(),
            ResponsePayload::Confirmed
        );
        assert_eq!(
            ResponsePayload::from_body("success\n").unwrap(),
            ResponsePayload::Confirmed
        );
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(
            ResponsePayload::from_body("").unwrap(),
            ResponsePayload::Json(Value::Null)
        );
    }

    #[test]
    fn non_json_body_is_rejected() {
        assert!(ResponsePayload::from_body("<html>").is_err());
        assert!(ResponsePayload::from_body("successful").is_err());
    }

    #[test]
    fn failure_carries_kind() {
        let err = Error::from(CloudError::Unauthenticated {
            message: "Access Token has expired".to_string(),
        });
        let response = ApiResponse::failure(&err);
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::Unauthenticated));

        let err = Error::from(RequestError::Status {
            url: "https://api.example.com".to_string(),
            status: 500,
            message: "Internal Server Error".to_string(),
        });
        let response = ApiResponse::from_outcome(Err(err));
        assert_eq!(response.error_kind, Some(ErrorKind::TransportError));
        assert_eq!(
            response.error.as_deref(),
            Some("HTTP 500 response error for https://api.example.com: Internal Server Error")
        );
    }

    #[test]
    fn serialized_envelope_omits_empty_fields() {
        let response = ApiResponse::from_outcome(Ok(ResponsePayload::Confirmed));
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"success": true}));

        let response = ApiResponse::ok(Some(json!({"id": "device-456"})));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": true, "data": {"id": "device-456"}})
        );
    }
}
