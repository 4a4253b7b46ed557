use std::sync::Arc;

use common::Outcome;
use serde::Serialize;

use crate::identity::{
    ChangePasswordRequest, ConfirmForgotPasswordRequest, ForgotPasswordRequest, IdentityError,
    IdentityProvider, LoginRequest, SignUpRequest, Tokens,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    fn new(message: &str) -> Outcome<Self> {
        Outcome::ok(Self {
            message: message.to_string(),
        })
    }
}

/// Thin translation layer over an [`IdentityProvider`].
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_up(
        &self,
        request: SignUpRequest,
    ) -> Result<Outcome<Acknowledgement>, IdentityError> {
        self.provider.sign_up(&request).await?;
        Ok(Acknowledgement::new("User created successfully"))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<Outcome<Tokens>, IdentityError> {
        let tokens = self.provider.login(&request).await?;
        Ok(Outcome::ok(tokens))
    }

    pub async fn forgot_password(
        &self,
        request: ForgotPasswordRequest,
    ) -> Result<Outcome<Acknowledgement>, IdentityError> {
        self.provider.forgot_password(&request).await?;
        Ok(Acknowledgement::new("Password reset code sent"))
    }

    pub async fn confirm_forgot_password(
        &self,
        request: ConfirmForgotPasswordRequest,
    ) -> Result<Outcome<Acknowledgement>, IdentityError> {
        self.provider.confirm_forgot_password(&request).await?;
        Ok(Acknowledgement::new("Password reset successful"))
    }

    pub async fn change_password(
        &self,
        request: ChangePasswordRequest,
    ) -> Result<Outcome<Acknowledgement>, IdentityError> {
        self.provider.change_password(&request).await?;
        Ok(Acknowledgement::new("Password changed successfully"))
    }
}
