use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use aws_sdk_cognitoidentityprovider::Client;
use tracing::debug;

use crate::identity::{
    ChangePasswordRequest, ConfirmForgotPasswordRequest, ForgotPasswordRequest, IdentityError,
    IdentityProvider, LoginRequest, SignUpRequest, Tokens,
};

const UNAUTHORIZED_CODES: &[&str] = &[
    "NotAuthorizedException",
    "UserNotFoundException",
    "UserNotConfirmedException",
    "PasswordResetRequiredException",
];

const REJECTED_CODES: &[&str] = &[
    "UsernameExistsException",
    "InvalidPasswordException",
    "InvalidParameterException",
    "CodeMismatchException",
    "ExpiredCodeException",
    "LimitExceededException",
    "TooManyFailedAttemptsException",
    "TooManyRequestsException",
];

/// Cognito user pool app client, driven with its public (secret-less) flows.
#[derive(Clone)]
pub struct CognitoIdentity {
    client: Client,
    client_id: String,
}

impl std::fmt::Debug for CognitoIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoIdentity")
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl CognitoIdentity {
    pub fn new(client: Client, client_id: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
        }
    }
}

fn classify_code(code: Option<&str>, detail: String) -> IdentityError {
    match code {
        Some(code) if UNAUTHORIZED_CODES.contains(&code) => IdentityError::Unauthorized(detail),
        Some(code) if REJECTED_CODES.contains(&code) => IdentityError::Rejected(detail),
        _ => IdentityError::Upstream(detail),
    }
}

fn classify<E, R>(operation: &'static str, err: SdkError<E, R>) -> IdentityError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let detail = format!("{operation}: {}", DisplayErrorContext(&err));
    classify_code(code.as_deref(), detail)
}

fn attribute(name: &str, value: &str) -> Result<AttributeType, IdentityError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|err| IdentityError::Upstream(format!("attribute {name}: {err}")))
}

fn sign_up_attributes(request: &SignUpRequest) -> Result<Vec<AttributeType>, IdentityError> {
    let mut attributes = vec![
        attribute("email", &request.email)?,
        attribute("given_name", &request.first_name)?,
        attribute("family_name", &request.last_name)?,
        attribute("preferred_username", &request.username)?,
    ];
    let tenant = [
        ("custom:tenant_id", &request.tenant_id),
        ("custom:tenant_name", &request.tenant_name),
        ("custom:tenant_role", &request.tenant_role),
    ];
    for (name, value) in tenant {
        if let Some(value) = value {
            attributes.push(attribute(name, value)?);
        }
    }
    Ok(attributes)
}

#[async_trait]
impl IdentityProvider for CognitoIdentity {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), IdentityError> {
        debug!("SignUp");
        self.client
            .sign_up()
            .client_id(&self.client_id)
            .username(&request.username)
            .password(&request.password)
            .set_user_attributes(Some(sign_up_attributes(request)?))
            .send()
            .await
            .map_err(|e| classify("SignUp", e))?;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<Tokens, IdentityError> {
        debug!("InitiateAuth");
        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", &request.username)
            .auth_parameters("PASSWORD", &request.password)
            .send()
            .await
            .map_err(|e| classify("InitiateAuth", e))?;

        // A challenge (e.g. NEW_PASSWORD_REQUIRED) comes back without tokens.
        let Some(result) = output.authentication_result() else {
            return Err(IdentityError::Rejected(format!(
                "InitiateAuth: challenge {:?} required",
                output.challenge_name()
            )));
        };

        Ok(Tokens {
            access_token: result.access_token().map(str::to_string),
            id_token: result.id_token().map(str::to_string),
            refresh_token: result.refresh_token().map(str::to_string),
        })
    }

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), IdentityError> {
        debug!("ForgotPassword");
        self.client
            .forgot_password()
            .client_id(&self.client_id)
            .username(&request.username)
            .send()
            .await
            .map_err(|e| classify("ForgotPassword", e))?;
        Ok(())
    }

    async fn confirm_forgot_password(
        &self,
        request: &ConfirmForgotPasswordRequest,
    ) -> Result<(), IdentityError> {
        debug!("ConfirmForgotPassword");
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(&request.username)
            .confirmation_code(&request.confirmation_code)
            .password(&request.new_password)
            .send()
            .await
            .map_err(|e| classify("ConfirmForgotPassword", e))?;
        Ok(())
    }

    async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), IdentityError> {
        debug!("ChangePassword");
        self.client
            .change_password()
            .access_token(&request.access_token)
            .previous_password(&request.previous_password)
            .proposed_password(&request.proposed_password)
            .send()
            .await
            .map_err(|e| classify("ChangePassword", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(tenant_id: Option<&str>) -> SignUpRequest {
        SignUpRequest {
            username: "ada".into(),
            password: "hunter22!".into(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            tenant_id: tenant_id.map(str::to_string),
            tenant_name: None,
            tenant_role: None,
        }
    }

    #[test]
    fn codes_map_to_kinds() {
        assert!(matches!(
            classify_code(Some("NotAuthorizedException"), String::new()),
            IdentityError::Unauthorized(_)
        ));
        assert!(matches!(
            classify_code(Some("UsernameExistsException"), String::new()),
            IdentityError::Rejected(_)
        ));
        assert!(matches!(
            classify_code(Some("CodeMismatchException"), String::new()),
            IdentityError::Rejected(_)
        ));
        assert!(matches!(
            classify_code(Some("InternalErrorException"), String::new()),
            IdentityError::Upstream(_)
        ));
        assert!(matches!(
            classify_code(None, "dispatch failure".into()),
            IdentityError::Upstream(detail) if detail == "dispatch failure"
        ));
    }

    #[test]
    fn sign_up_sends_profile_attributes() {
        let attributes = sign_up_attributes(&sign_up(None)).unwrap();
        let names: Vec<_> = attributes.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["email", "given_name", "family_name", "preferred_username"]
        );
        assert_eq!(attributes[0].value(), Some("ada@example.com"));
    }

    #[test]
    fn tenant_attributes_only_when_present() {
        let attributes = sign_up_attributes(&sign_up(Some("t-1"))).unwrap();
        let tenant = attributes.last().unwrap();
        assert_eq!(tenant.name(), "custom:tenant_id");
        assert_eq!(tenant.value(), Some("t-1"));
        assert_eq!(attributes.len(), 5);
    }
}
