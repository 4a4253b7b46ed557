//! The identity provider seam and the payloads that cross it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub tenant_role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmForgotPasswordRequest {
    pub username: String,
    pub confirmation_code: String,
    pub new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub access_token: String,
    pub previous_password: String,
    pub proposed_password: String,
}

/// Tokens issued on login, passed through untouched.
#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Provider failures, classified by what the caller did wrong (if anything).
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Credentials, token or user state do not permit the operation.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The provider refused the input (duplicate user, password policy, bad code...).
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("identity provider failure: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), IdentityError>;

    async fn login(&self, request: &LoginRequest) -> Result<Tokens, IdentityError>;

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), IdentityError>;

    async fn confirm_forgot_password(
        &self,
        request: &ConfirmForgotPasswordRequest,
    ) -> Result<(), IdentityError>;

    async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), IdentityError>;
}
