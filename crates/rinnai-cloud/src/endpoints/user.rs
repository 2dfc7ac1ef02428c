//! Account queries.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::instrument;

use rinnai_core::{ApiResponse, CloudError, Endpoints, Error, Method, Result};

use super::catalog::{self, GRAPHQL_HEADERS};
use super::graphql_data;
use crate::pipeline::{AuthenticatedRequestPipeline, RequestOptions};
use crate::store::CredentialStore;

/// Reads the logged-in account and its devices.
#[derive(Debug, Clone)]
pub struct UserApi {
    pipeline: Arc<AuthenticatedRequestPipeline>,
    store: Arc<CredentialStore>,
    endpoints: Endpoints,
}

impl UserApi {
    pub(crate) fn new(
        pipeline: Arc<AuthenticatedRequestPipeline>,
        store: Arc<CredentialStore>,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            pipeline,
            store,
            endpoints,
        }
    }

    /// Fetch the account record of the logged-in identity.
    ///
    /// The data is the first user the service returns for the identity, or
    /// absent when there is none.
    #[instrument(skip(self))]
    pub async fn get_info(&self) -> Result<ApiResponse> {
        let Some(identity) = self.store.identity().await else {
            let err = Error::from(CloudError::Unauthenticated {
                message: "No identity; log in first".to_string(),
            });
            return Ok(ApiResponse::failure(&err));
        };

        let url = &self.endpoints.graphql;
        let options = RequestOptions::new()
            .headers(GRAPHQL_HEADERS)
            .body(catalog::graphql_payload(
                catalog::GET_USER_BY_EMAIL_QUERY,
                json!({ "email": identity }),
            ));

        let outcome = self
            .pipeline
            .execute(Method::Post, url, options)
            .await
            .and_then(|payload| graphql_data(url, payload).map_err(Error::from));

        Ok(match outcome {
            Ok(data) => ApiResponse::ok(data.and_then(first_user)),
            Err(err) => ApiResponse::failure(&err),
        })
    }
}

fn first_user(mut data: Value) -> Option<Value> {
    data.get_mut("getUserByEmail")?
        .get_mut("items")?
        .as_array_mut()?
        .first_mut()
        .map(Value::take)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_user_is_picked() {
        let data = json!({"getUserByEmail": {"items": [{"email": "a"}, {"email": "b"}]}});
        assert_eq!(first_user(data), Some(json!({"email": "a"})));

        let data = json!({"getUserByEmail": {"items": []}});
        assert_eq!(first_user(data), None);
        assert_eq!(first_user(json!({"getUserByEmail": null})), None);
    }
}
