//! Amazon Cognito user pool identity provider.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use rinnai_core::{
    AccessToken, Credentials, IdToken, IdentityPool, IdentityProvider, ProviderError,
    RefreshToken, SessionTokens, TokenSet,
};

const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";
const REFRESH_TOKEN_AUTH: &str = "REFRESH_TOKEN_AUTH";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

impl std::fmt::Debug for AuthParameters<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthParameters")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Authenticates against a Cognito user pool with the JSON 1.1 API.
///
/// Each provider owns its HTTP connection pool.
#[derive(Debug, Clone)]
pub struct CognitoIdentityProvider {
    http: reqwest::Client,
    pool: IdentityPool,
}

impl CognitoIdentityProvider {
    /// Create a provider for `pool`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(pool: IdentityPool) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("rinnai-cloud/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http, pool })
    }

    pub fn pool(&self) -> &IdentityPool {
        &self.pool
    }

    async fn initiate_auth(
        &self,
        request: &InitiateAuthRequest<'_>,
    ) -> Result<AuthenticationResult, ProviderError> {
        let url = self.pool.endpoint_url();
        debug!(flow = request.auth_flow, %url, "InitiateAuth");

        let body = serde_json::to_string(request).map_err(|e| ProviderError::Transport {
            message: e.to_string(),
        })?;

        let response = self
            .http
            .post(&url)
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ProviderError::Transport {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(service_error(status, &text));
        }

        let parsed: InitiateAuthResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Transport {
                message: format!("malformed InitiateAuth response: {e}"),
            })?;

        match (parsed.authentication_result, parsed.challenge_name) {
            (Some(result), _) => Ok(result),
            (None, Some(name)) => Err(ProviderError::Challenge { name }),
            (None, None) => Err(ProviderError::Transport {
                message: "InitiateAuth response has no authentication result".to_string(),
            }),
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    #[instrument(skip(self, credentials), fields(identity = credentials.identity()))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<TokenSet, ProviderError> {
        let request = InitiateAuthRequest {
            auth_flow: USER_PASSWORD_AUTH,
            client_id: &self.pool.client_id,
            auth_parameters: AuthParameters {
                username: Some(credentials.identity()),
                password: Some(credentials.password()),
                refresh_token: None,
            },
        };

        let result = self.initiate_auth(&request).await?;
        let refresh_token = result
            .refresh_token
            .clone()
            .ok_or_else(|| ProviderError::Transport {
                message: "InitiateAuth response has no refresh token".to_string(),
            })?;

        Ok(TokenSet {
            tokens: session_tokens(result),
            refresh_token: RefreshToken::new(refresh_token),
        })
    }

    #[instrument(skip_all)]
    async fn renew(
        &self,
        _access_token: &AccessToken,
        refresh_token: &RefreshToken,
    ) -> Result<SessionTokens, ProviderError> {
        let request = InitiateAuthRequest {
            auth_flow: REFRESH_TOKEN_AUTH,
            client_id: &self.pool.client_id,
            auth_parameters: AuthParameters {
                username: None,
                password: None,
                refresh_token: Some(refresh_token.as_str()),
            },
        };

        let result = self.initiate_auth(&request).await?;
        Ok(session_tokens(result))
    }
}

fn session_tokens(result: AuthenticationResult) -> SessionTokens {
    let tokens = SessionTokens::new(
        IdToken::new(result.id_token),
        AccessToken::new(result.access_token),
    );
    match result.expires_in {
        Some(seconds) => tokens.with_expiry(Utc::now() + ChronoDuration::seconds(seconds)),
        None => tokens,
    }
}

/// Turn an error response into a service error.
///
/// `__type` may carry a namespace prefix ending in `#`.
fn service_error(status: reqwest::StatusCode, text: &str) -> ProviderError {
    match serde_json::from_str::<ServiceErrorBody>(text) {
        Ok(ServiceErrorBody {
            error_type: Some(error_type),
            message,
        }) => {
            let code = error_type
                .rsplit('#')
                .next()
                .unwrap_or(error_type.as_str())
                .to_string();
            ProviderError::Service {
                code,
                message: message.unwrap_or_default(),
            }
        }
        _ => ProviderError::Transport {
            message: format!("identity provider answered HTTP {}", status.as_u16()),
        },
    }
}
