//! Login, registration, and logout.

use crate::client::{decode_json, ApiClient, Auth};
use crate::error::ApiError;
use reqwest::Method;
use starc_core::models::auth::{GoogleLoginRequest, LoginRequest, RegisterRequest, TokenPair};
use tracing::info;

impl ApiClient {
    /// `POST /auth/login`; stores the issued tokens in the session.
    pub async fn login(&self, login_identifier: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = LoginRequest {
            login_identifier: login_identifier.trim().to_string(),
            password: password.to_string(),
        };
        let url = self.endpoint(&["auth", "login"])?;
        let response = self
            .execute("login", Auth::Anonymous, || {
                Ok(self.request(Method::POST, url.clone()).json(&body))
            })
            .await?;
        self.accept_tokens(decode_json(response).await?)
    }

    /// `POST /auth/google`; exchanges a Google identity token for session tokens.
    pub async fn google_login(&self, id_token: &str) -> Result<TokenPair, ApiError> {
        let body = GoogleLoginRequest {
            token: id_token.trim().to_string(),
        };
        let url = self.endpoint(&["auth", "google"])?;
        let response = self
            .execute("google_login", Auth::Anonymous, || {
                Ok(self.request(Method::POST, url.clone()).json(&body))
            })
            .await?;
        self.accept_tokens(decode_json(response).await?)
    }

    /// `POST /auth/register`. Registration does not log the user in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "register"])?;
        self.execute("register", Auth::Anonymous, || {
            Ok(self.request(Method::POST, url.clone()).json(request))
        })
        .await?;
        info!(username = %request.username, "account registered");
        Ok(())
    }

    /// Clear tokens and the open document. Local only; the API keeps no
    /// server-side session to end.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().logout()?;
        info!("logged out");
        Ok(())
    }

    fn accept_tokens(&self, tokens: TokenPair) -> Result<TokenPair, ApiError> {
        if tokens.access_token.trim().is_empty() {
            return Err(ApiError::Unauthorized(
                "login returned an empty access token".to_string(),
            ));
        }
        self.session().store_tokens(&tokens)?;
        info!("logged in");
        Ok(tokens)
    }
}
