use std::sync::Arc;

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use common::request::{decoded_body, parse_json};
use common::{ConfigError, Cors, Resolved, Responder, Router, ServiceError};
use http::Method;
use lambda_runtime::{Error, LambdaEvent};
use tracing::{debug, warn};

use crate::identity::IdentityError;
use crate::service::AuthService;

pub const AUTH_PATH: &str = "/auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignUp,
    Login,
    ForgotPassword,
    ConfirmForgotPassword,
    ChangePassword,
}

impl AuthAction {
    pub const ALL: [AuthAction; 5] = [
        AuthAction::SignUp,
        AuthAction::Login,
        AuthAction::ForgotPassword,
        AuthAction::ConfirmForgotPassword,
        AuthAction::ChangePassword,
    ];

    /// Value of the `action` query parameter.
    pub fn name(self) -> &'static str {
        match self {
            AuthAction::SignUp => "signup",
            AuthAction::Login => "login",
            AuthAction::ForgotPassword => "forgot-password",
            AuthAction::ConfirmForgotPassword => "confirm-forgot-password",
            AuthAction::ChangePassword => "change-password",
        }
    }

    /// Fixed message returned whenever the provider turns the action down.
    pub fn failure_message(self) -> &'static str {
        match self {
            AuthAction::SignUp => "Failed to create user",
            AuthAction::Login => "Invalid credentials",
            AuthAction::ForgotPassword => "Failed to process password reset request",
            AuthAction::ConfirmForgotPassword => "Failed to reset password",
            AuthAction::ChangePassword => "Failed to change password",
        }
    }

    fn reject(self, err: IdentityError) -> ServiceError {
        warn!(action = self.name(), error = %err, "identity provider refused request");
        match err {
            IdentityError::Unauthorized(_) => {
                ServiceError::Unauthorized(self.failure_message().to_string())
            }
            IdentityError::Rejected(_) => ServiceError::validation(self.failure_message()),
            IdentityError::Upstream(_) => ServiceError::upstream(err),
        }
    }
}

pub fn routes() -> Router<AuthAction> {
    AuthAction::ALL
        .into_iter()
        .fold(Router::new(), |router, action| {
            router.action(AUTH_PATH, Method::POST, action.name(), action)
        })
}

pub struct AppState {
    router: Router<AuthAction>,
    responder: Responder,
    service: AuthService,
}

impl AppState {
    pub fn new(service: AuthService, allowed_origin: &str) -> Result<Self, ConfigError> {
        let router = routes();
        let cors = Cors::new(allowed_origin, &router.allowed_methods())?;
        Ok(Self {
            router,
            responder: Responder::new(cors),
            service,
        })
    }
}

pub async fn function_handler(
    state: Arc<AppState>,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let request = event.payload;
    debug!(
        request_id = %event.context.request_id,
        method = %request.http_method,
        path = ?request.path,
        "incoming event"
    );

    let response = match state.router.resolve(&request) {
        Ok(Resolved::Preflight) => state.responder.acknowledge(),
        Ok(Resolved::Operation(action)) => match dispatch(&state, action, &request).await {
            Ok(response) => response,
            Err(err) => state.responder.from_error(&err),
        },
        Err(err) => state.responder.from_error(&err),
    };

    Ok(response)
}

async fn dispatch(
    state: &AppState,
    action: AuthAction,
    request: &ApiGatewayProxyRequest,
) -> Result<ApiGatewayProxyResponse, ServiceError> {
    let body = decoded_body(request)?;
    let service = &state.service;
    let responder = &state.responder;

    let response = match action {
        AuthAction::SignUp => {
            let outcome = service.sign_up(parse_json(&body)?).await;
            responder.outcome(outcome.map_err(|e| action.reject(e))?)
        }
        AuthAction::Login => {
            let outcome = service.login(parse_json(&body)?).await;
            responder.outcome(outcome.map_err(|e| action.reject(e))?)
        }
        AuthAction::ForgotPassword => {
            let outcome = service.forgot_password(parse_json(&body)?).await;
            responder.outcome(outcome.map_err(|e| action.reject(e))?)
        }
        AuthAction::ConfirmForgotPassword => {
            let outcome = service.confirm_forgot_password(parse_json(&body)?).await;
            responder.outcome(outcome.map_err(|e| action.reject(e))?)
        }
        AuthAction::ChangePassword => {
            let outcome = service.change_password(parse_json(&body)?).await;
            responder.outcome(outcome.map_err(|e| action.reject(e))?)
        }
    };

    Ok(response)
}
