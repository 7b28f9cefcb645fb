//! The refresh-and-retry coordinator.
//!
//! Wraps the [`Dispatcher`] so that an expired access token is recovered
//! transparently. Per logical call:
//!
//! ```text
//! PENDING -> SUCCESS | AUTH_FAILURE
//! AUTH_FAILURE -> REFRESHING -> RETRY_PENDING -> SUCCESS | FAILURE
//!                           \-> REFRESH_FAILED -> LOGGED_OUT
//! ```
//!
//! The retry marker travels on the [`PendingRequest`] itself, so there is at
//! most one refresh and one replay per call and concurrent calls never
//! share state. Concurrent 401s each refresh on their own; the last
//! successful refresh wins in the store.

use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

use super::{
    dispatcher::Dispatcher,
    errors::{ApiError, ApiResult},
    request::PendingRequest,
};
use crate::{
    models::{RefreshRequest, RefreshResponse},
    store::CredentialStore,
};

/// Endpoint exchanging a refresh token for a new access token.
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

#[derive(Debug, Clone)]
pub struct Coordinator {
    dispatcher: Dispatcher,
}

impl Coordinator {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        self.dispatcher.store()
    }

    /// Run `request` through the refresh policy and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Any dispatcher error that the policy does not recover from, or
    /// `Decode` if the body does not match `T`.
    pub async fn execute<T: DeserializeOwned>(&self, request: PendingRequest) -> ApiResult<T> {
        let value = self.execute_value(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Like [`Coordinator::execute`] for endpoints whose body is irrelevant.
    pub async fn execute_discard(&self, request: PendingRequest) -> ApiResult<()> {
        self.execute::<IgnoredAny>(request).await.map(|_| ())
    }

    /// Run `request` through the refresh policy, returning the raw body.
    pub async fn execute_value(&self, request: PendingRequest) -> ApiResult<Value> {
        let original = match self.dispatcher.dispatch(&request).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_authorization_failure() && request.authorize && !request.is_retry() => e,
            Err(e) => return Err(e),
        };

        let Some(refresh_token) = self.store().refresh_token() else {
            return Err(original);
        };

        tracing::debug!(http_path = %request.path, "Access token rejected, refreshing session");
        match self.request_access_token(&refresh_token).await {
            Ok(access_token) => {
                if !self.install_access_token(access_token, &refresh_token) {
                    tracing::info!(http_path = %request.path, "Session ended during refresh, not retrying");
                    return Err(original);
                }
                tracing::info!(http_path = %request.path, "Session refreshed, retrying request");
                self.dispatcher.dispatch(&request.retried()).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, signing out");
                if let Err(e) = self.store().logout() {
                    tracing::warn!(error = %e, "Failed to persist cleared credentials");
                }
                Err(original)
            }
        }
    }

    /// Exchange the stored refresh token for a new access token and store it.
    ///
    /// A rejection by the refresh endpoint ends the session and clears the
    /// store. Transport failures leave the store untouched.
    ///
    /// # Errors
    ///
    /// * `NotAuthenticated` - no refresh token is stored, or the session was
    ///   ended while the refresh was in flight
    /// * `Refresh` - the refresh endpoint rejected the token
    /// * `Transport` / `Decode` - as for any other call
    pub async fn refresh_session(&self) -> ApiResult<()> {
        let refresh_token = self
            .store()
            .refresh_token()
            .ok_or(ApiError::NotAuthenticated)?;

        match self.request_access_token(&refresh_token).await {
            Ok(access_token) => {
                if !self.install_access_token(access_token, &refresh_token) {
                    tracing::info!("Session ended during refresh");
                    return Err(ApiError::NotAuthenticated);
                }
                tracing::info!("Session refreshed");
                Ok(())
            }
            Err(e @ ApiError::Refresh { .. }) => {
                tracing::warn!(error = %e, "Session refresh rejected, signing out");
                if let Err(e) = self.store().logout() {
                    tracing::warn!(error = %e, "Failed to persist cleared credentials");
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Store a refreshed access token unless the session it was issued for
    /// has since been ended or replaced. Returns whether it was stored.
    fn install_access_token(&self, access_token: String, refresh_token: &str) -> bool {
        match self.store().refresh_access_token(access_token, refresh_token) {
            Ok(installed) => installed,
            Err(e) => {
                // Memory already holds the new token
                tracing::warn!(error = %e, "Failed to persist refreshed access token");
                true
            }
        }
    }

    /// Call the refresh endpoint directly through the dispatcher, bypassing
    /// the retry policy.
    async fn request_access_token(&self, refresh_token: &str) -> ApiResult<String> {
        let request = PendingRequest::post(REFRESH_PATH)
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })?
            .anonymous();

        let value = self
            .dispatcher
            .dispatch(&request)
            .await
            .map_err(into_refresh_error)?;
        let response: RefreshResponse = serde_json::from_value(value)?;

        if response.access_token.is_empty() {
            return Err(ApiError::Refresh {
                status: None,
                body: serde_json::json!({ "detail": "refresh returned an empty access token" }),
            });
        }
        Ok(response.access_token)
    }
}

fn into_refresh_error(error: ApiError) -> ApiError {
    match error {
        ApiError::Authorization { body } => ApiError::Refresh {
            status: Some(401),
            body,
        },
        ApiError::Validation { status, body } | ApiError::Server { status, body } => {
            ApiError::Refresh {
                status: Some(status),
                body,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_refresh_endpoint_statuses_become_refresh_errors() {
        let err = into_refresh_error(ApiError::from_status(401, json!({ "detail": "expired" })));
        assert!(matches!(err, ApiError::Refresh { status: Some(401), .. }));
        assert_eq!(err.detail(), Some("expired"));

        let err = into_refresh_error(ApiError::from_status(500, json!({})));
        assert!(matches!(err, ApiError::Refresh { status: Some(500), .. }));
    }

    #[test]
    fn test_non_status_errors_pass_through() {
        let err = into_refresh_error(ApiError::NotAuthenticated);
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_refresh_session_without_refresh_token() {
        let coordinator = Coordinator::new(Dispatcher::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            Arc::new(CredentialStore::in_memory()),
        ));

        let err = coordinator.refresh_session().await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_unreachable_backend_propagates_without_refresh() {
        let store = Arc::new(CredentialStore::in_memory());
        store.set_tokens("A1", "R1").unwrap();
        let coordinator = Coordinator::new(Dispatcher::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            store.clone(),
        ));

        let err = coordinator
            .execute_value(PendingRequest::get("/api/v1/projects"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
        // Transport failures never touch the credentials
        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }
}
