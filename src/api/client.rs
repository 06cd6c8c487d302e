//! Reqwest-backed client for the assistant backend.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use url::Url;

use super::traits::{AssistantApi, AuthApi, MailApi};
use super::types::{AskEnvelope, AskRequest, EmailListEnvelope, IdentityEnvelope};
use super::{ApiError, ApiResult};
use crate::domain::{AskAnswer, AuthProvider, EmailMessage};

/// Error body some endpoints return alongside a non-success status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

/// Statuses that prove the presented credential is invalid.
fn is_auth_rejection_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 401 | 403)
}

/// HTTP client for the assistant backend.
///
/// Holds the bearer token for the current session; every request made
/// through this client carries it once set. The token slot is shared
/// across clones of the surrounding `Arc`, so attaching a credential in
/// one service is visible to all of them.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    bearer: RwLock<Option<String>>,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// The base URL should be an origin (scheme, host, optional port);
    /// endpoint paths are joined onto it.
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            bearer: RwLock::new(None),
        }
    }

    /// Overrides the HTTP client, e.g. to set timeouts.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Returns the backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the currently attached bearer token, if any.
    ///
    /// The token slot stays usable even if a panic elsewhere poisoned
    /// the lock; the stored value is a plain `Option` and cannot be
    /// left half-written.
    pub fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Builds the URL the login flow should open in a browser.
    ///
    /// The backend runs the OAuth dance itself and redirects back into
    /// the app with the resulting token in the query string.
    pub fn login_url(&self, provider: AuthProvider) -> ApiResult<Url> {
        self.endpoint(&format!("/api/auth/{}", provider.as_str()))
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.bearer() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn handle_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status();

        if is_auth_rejection_status(status) {
            return ApiError::Rejected {
                status: status.as_u16(),
            };
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.into_message(),
            Err(_) => None,
        };

        ApiError::Api {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self.request(Method::GET, url).send().await?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    fn set_bearer(&self, token: Option<&str>) {
        let mut bearer = self
            .bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *bearer = token.map(str::to_owned);
    }

    async fn fetch_identity(&self) -> ApiResult<IdentityEnvelope> {
        let url = self.endpoint("/api/auth/me")?;
        self.get_json(url).await
    }

    async fn logout(&self) -> ApiResult<()> {
        let url = self.endpoint("/api/auth/logout")?;
        let response = self.request(Method::GET, url).send().await?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl MailApi for ApiClient {
    async fn recent_messages(&self, limit: u32) -> ApiResult<Vec<EmailMessage>> {
        let mut url = self.endpoint("/api/emails")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let envelope: EmailListEnvelope = self.get_json(url).await?;
        if !envelope.success {
            return Err(ApiError::Api {
                status: 200,
                message: envelope
                    .error
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            });
        }
        Ok(envelope.emails)
    }
}

#[async_trait]
impl AssistantApi for ApiClient {
    async fn ask(&self, request: AskRequest) -> ApiResult<AskAnswer> {
        let url = self.endpoint("/api/ask")?;
        let response = self
            .request(Method::POST, url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let envelope: AskEnvelope = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {}", e)))?;

        if !envelope.success {
            return Err(ApiError::Api {
                status: 200,
                message: envelope
                    .error
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            });
        }

        let text = envelope
            .answer
            .ok_or_else(|| ApiError::InvalidResponse("success without an answer".to_string()))?;

        Ok(AskAnswer {
            text,
            model: request.model,
        })
    }
}
