//! Authentication request and response payloads.

use serde::{Deserialize, Serialize};

/// Credentials for username/email + password login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub login_identifier: String,
    pub password: String,
}

/// Third-party (Google) identity token exchange.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Payload for creating an account.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Tokens issued by login, Google login, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
