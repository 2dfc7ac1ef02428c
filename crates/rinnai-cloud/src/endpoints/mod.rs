//! Device and user endpoint facades.

pub mod catalog;
mod device;
mod user;

pub use device::DeviceApi;
pub use user::UserApi;

use serde_json::Value;

use rinnai_core::{RequestError, ResponsePayload};

/// Unwrap the `data` member of a GraphQL response.
///
/// A response carrying `errors` fails with every message joined by `; `.
fn graphql_data(url: &str, payload: ResponsePayload) -> Result<Option<Value>, RequestError> {
    let Some(mut response) = payload.into_json() else {
        return Ok(None);
    };

    if let Some(errors) = response.get("errors").filter(|errors| !errors.is_null()) {
        let messages = errors
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .map(|error| {
                        error
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("Unknown error")
                            .to_string()
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        return Err(RequestError::GraphQl {
            url: url.to_string(),
            messages: messages.join("; "),
        });
    }

    Ok(response
        .get_mut("data")
        .map(Value::take)
        .filter(|data| !data.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn graphql_errors_are_joined() {
        let payload = ResponsePayload::Json(json!({
            "errors": [{"message": "Not Authorized"}, {"message": "Bad email"}, {}]
        }));
        let err = graphql_data("https://api.example.com/graphql", payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Not Authorized; Bad email; Unknown error"
        );
    }

    #[test]
    fn data_is_unwrapped() {
        let payload = ResponsePayload::Json(json!({"data": {"getDevice": {"id": "device-456"}}}));
        let data = graphql_data("https://api.example.com/graphql", payload).unwrap();
        assert_eq!(data, Some(json!({"getDevice": {"id": "device-456"}})));

        let payload = ResponsePayload::Json(json!({"data": null}));
        assert_eq!(graphql_data("u", payload).unwrap(), None);
        assert_eq!(graphql_data("u", ResponsePayload::Confirmed).unwrap(), None);
    }
}
