//! Authentication endpoints
//!
//! A successful login or registration stores the token and user in the
//! client's [`AuthSession`](crate::session::AuthSession), so every later
//! request carries the bearer token.

use shared::models::{Credentials, LoginResponse, RegisterRequest, TokenResponse, UserProfile};
use shared::validation::{validate_credentials, validate_registration};

use crate::api::ApiClient;
use crate::error::ClientResult;

const BASE_PATH: &str = "/auth";

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<UserProfile> {
        validate_credentials(credentials)?;

        let response: LoginResponse = self
            .api
            .post(&format!("{}/login", BASE_PATH), credentials)
            .await?;

        tracing::info!("Signed in as {}", response.user.email);
        self.api.session().sign_in(response.token, response.user.clone());
        Ok(response.user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserProfile> {
        validate_registration(request)?;

        let response: LoginResponse = self
            .api
            .post(&format!("{}/register", BASE_PATH), request)
            .await?;

        self.api.session().sign_in(response.token, response.user.clone());
        Ok(response.user)
    }

    /// Notify the backend and forget the session. The local session is
    /// cleared even when the backend call fails.
    pub async fn logout(&self) -> ClientResult<()> {
        let result: ClientResult<()> = self
            .api
            .post(&format!("{}/logout", BASE_PATH), &serde_json::json!({}))
            .await;
        self.api.session().clear();

        if let Err(e) = &result {
            tracing::warn!("Logout request failed: {}", e);
        }
        result
    }

    /// Fetch the signed-in user and cache it in the session
    pub async fn me(&self) -> ClientResult<UserProfile> {
        let user: UserProfile = self.api.get(&format!("{}/me", BASE_PATH)).await?;
        self.api.session().set_user(user.clone());
        Ok(user)
    }

    pub async fn refresh(&self) -> ClientResult<String> {
        let response: TokenResponse = self
            .api
            .post(&format!("{}/refresh", BASE_PATH), &serde_json::json!({}))
            .await?;
        self.api.session().set_token(response.token.clone());
        Ok(response.token)
    }
}
