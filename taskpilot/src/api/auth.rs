//! Authentication facade.

use crate::{
    models::{AuthResponse, LoginRequest, LogoutRequest, ProfileUpdate, RegisterRequest, UserProfile},
    net::{ApiError, ApiResult, Coordinator, PendingRequest},
    store::CredentialError,
};

const LOGIN: &str = "/api/v1/auth/login";
const REGISTER: &str = "/api/v1/auth/register";
const LOGOUT: &str = "/api/v1/auth/logout";
const ME: &str = "/api/v1/auth/me";

pub struct AuthApi<'a> {
    coordinator: &'a Coordinator,
}

impl<'a> AuthApi<'a> {
    pub fn new(coordinator: &'a Coordinator) -> Self {
        Self { coordinator }
    }

    /// Sign in and store the new session.
    ///
    /// # Errors
    ///
    /// * `Authorization` / `Validation` - bad credentials or input
    /// * `Decode` - the response lacked tokens or a profile
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<UserProfile> {
        let response: AuthResponse = self
            .coordinator
            .execute(PendingRequest::post(LOGIN).json(request)?.anonymous())
            .await?;
        self.establish(response, "Logged in")
    }

    /// Create an account; the backend signs the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<UserProfile> {
        let response: AuthResponse = self
            .coordinator
            .execute(PendingRequest::post(REGISTER).json(request)?.anonymous())
            .await?;
        self.establish(response, "Registered")
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// * `NotAuthenticated` - no refresh token is stored
    /// * `Refresh` - the token was rejected; the store has been cleared
    pub async fn refresh(&self) -> ApiResult<()> {
        self.coordinator.refresh_session().await
    }

    /// End the session on the backend and clear local credentials.
    ///
    /// The store is cleared even when the backend cannot be reached, and
    /// this never fails.
    pub async fn logout(&self) {
        let store = self.coordinator.store();
        let credentials = store.snapshot();

        if credentials.access_token.is_some() || credentials.refresh_token.is_some() {
            let body = LogoutRequest {
                refresh_token: credentials.refresh_token,
            };
            let outcome = match PendingRequest::post(LOGOUT).json(&body) {
                Ok(request) => self.coordinator.execute_discard(request).await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }

        if let Err(e) = store.logout() {
            tracing::warn!(error = %e, "Failed to persist cleared credentials");
        }
        tracing::info!("Logged out");
    }

    /// Fetch the current profile and refresh the cached copy.
    pub async fn me(&self) -> ApiResult<UserProfile> {
        let user: UserProfile = self.coordinator.execute(PendingRequest::get(ME)).await?;
        self.cache_user(&user);
        Ok(user)
    }

    /// Update the current profile and refresh the cached copy.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        let user: UserProfile = self
            .coordinator
            .execute(PendingRequest::put(ME).json(update)?)
            .await?;
        self.cache_user(&user);
        Ok(user)
    }

    fn establish(&self, response: AuthResponse, event: &str) -> ApiResult<UserProfile> {
        let AuthResponse {
            access_token,
            refresh_token,
            user,
            ..
        } = response;

        match self
            .coordinator
            .store()
            .establish(access_token, refresh_token, user.clone())
        {
            Ok(()) => {}
            Err(CredentialError::EmptyAccessToken) => {
                return Err(ApiError::malformed("access_token must not be empty"));
            }
            Err(e) => tracing::warn!(error = %e, "Failed to persist new session"),
        }

        tracing::info!(user_id = user.id, "{}", event);
        Ok(user)
    }

    fn cache_user(&self, user: &UserProfile) {
        if let Err(e) = self.coordinator.store().set_user(user.clone()) {
            tracing::warn!(error = %e, "Failed to persist user profile");
        }
    }
}
