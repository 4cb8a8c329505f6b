//! Request pipeline: bearer injection, error mapping, and single-flight refresh.

use crate::error::ApiError;
use crate::url::{api_url, parse_base};
use reqwest::{header, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use starc_core::models::auth::TokenPair;
use starc_core::{Config, SessionHandle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

struct Inner {
    http: reqwest::Client,
    base: Url,
    session: SessionHandle,
    // Held for the duration of a refresh so concurrent 401s share one call.
    refresh_gate: AsyncMutex<()>,
}

/// Cheaply cloneable handle to the remote API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Bearer,
    Anonymous,
}

impl ApiClient {
    /// Build a client for `base_url` sharing `session`.
    ///
    /// # Errors
    /// Returns an error for an invalid base URL or when the HTTP client
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        session: SessionHandle,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base = parse_base(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("starc/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base,
                session,
                refresh_gate: AsyncMutex::new(()),
            }),
        })
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &Config, session: SessionHandle) -> Result<Self, ApiError> {
        Self::new(&config.api_url, session, config.request_timeout)
    }

    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        api_url(&self.inner.base, segments)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.http.request(method, url)
    }

    /// Send a request built by `make`, retrying once after a token refresh
    /// when an authenticated call comes back `401`.
    ///
    /// `make` is invoked once per attempt so bodies are rebuilt for the retry.
    pub(crate) async fn execute<F>(
        &self,
        action: &'static str,
        auth: Auth,
        make: F,
    ) -> Result<Response, ApiError>
    where
        F: Fn() -> Result<RequestBuilder, ApiError>,
    {
        let token = match auth {
            Auth::Bearer => self.inner.session.access_token(),
            Auth::Anonymous => None,
        };
        let response = self.dispatch(action, make()?, token.as_deref()).await?;
        if auth == Auth::Anonymous || response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response).await;
        }

        debug!(action, "request unauthorized; attempting token refresh");
        let Some(fresh) = self.refresh_after_unauthorized(token.as_deref()).await? else {
            return ensure_success(response).await;
        };
        let retry = self.dispatch(action, make()?, Some(&fresh)).await?;
        ensure_success(retry).await
    }

    async fn dispatch(
        &self,
        action: &'static str,
        builder: RequestBuilder,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let started = Instant::now();
        let response = builder.send().await?;
        debug!(
            action,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "api request"
        );
        Ok(response)
    }

    /// Obtain a usable access token after `stale` was rejected.
    ///
    /// Callers queue on the refresh gate; whoever enters after a successful
    /// refresh sees a token different from the one they sent and reuses it
    /// instead of refreshing again.
    async fn refresh_after_unauthorized(
        &self,
        stale: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        let _gate = self.inner.refresh_gate.lock().await;
        let session = &self.inner.session;

        if let Some(current) = session.access_token() {
            if Some(current.as_str()) != stale {
                return Ok(Some(current));
            }
        }

        let Some(refresh_token) = session.refresh_token() else {
            session.clear_tokens()?;
            return Ok(None);
        };

        match self.request_refresh(&refresh_token).await {
            Ok(access) => {
                session.set_access_token(&access)?;
                info!("access token refreshed");
                Ok(Some(access))
            }
            Err(err) => {
                warn!("token refresh failed: {}", err);
                session.clear_tokens()?;
                Ok(None)
            }
        }
    }

    /// `POST /auth/refresh` with the refresh token as bearer.
    pub(crate) async fn request_refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["auth", "refresh"])?;
        let response = self
            .dispatch(
                "refresh",
                self.request(Method::POST, url)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body("{}"),
                Some(refresh_token),
            )
            .await?;
        let tokens: TokenPair = decode_json(ensure_success(response).await?).await?;
        if tokens.access_token.trim().is_empty() {
            return Err(ApiError::Unauthorized(
                "refresh returned an empty access token".to_string(),
            ));
        }
        Ok(tokens.access_token)
    }

    /// Refresh the access token explicitly, outside the 401 path.
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthorized`] when no refresh token is stored.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        let _gate = self.inner.refresh_gate.lock().await;
        let refresh_token = self
            .inner
            .session
            .refresh_token()
            .ok_or_else(|| ApiError::Unauthorized("no refresh token stored".to_string()))?;
        let access = self.request_refresh(&refresh_token).await?;
        self.inner.session.set_access_token(&access)?;
        Ok(access)
    }
}

/// Pass successful responses through; map everything else onto [`ApiError`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    Err(ApiError::from_status(status, &body))
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
