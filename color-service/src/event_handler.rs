use std::sync::Arc;

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use common::request::{decoded_body, query_param};
use common::{ConfigError, Cors, Resolved, Responder, Router, ServiceError};
use http::Method;
use lambda_runtime::{Error, LambdaEvent};
use tracing::debug;

use crate::model::ColorSubmission;
use crate::service::ColorService;

pub const MISSING_NAME: &str = "Missing required name parameter";

const NAME_PARAMS: [&str; 2] = ["name", "firstName"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRoute {
    Submit,
    Search,
}

pub fn routes(path: &str) -> Router<ColorRoute> {
    Router::new()
        .route(path, Method::POST, ColorRoute::Submit)
        .route(path, Method::GET, ColorRoute::Search)
}

/// Everything an invocation needs, built once per execution environment.
pub struct AppState {
    router: Router<ColorRoute>,
    responder: Responder,
    service: ColorService,
}

impl AppState {
    pub fn new(
        service: ColorService,
        allowed_origin: &str,
        colors_path: &str,
    ) -> Result<Self, ConfigError> {
        let router = routes(colors_path);
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
        Ok(Resolved::Operation(route)) => match dispatch(&state, route, &request).await {
            Ok(response) => response,
            Err(err) => state.responder.from_error(&err),
        },
        Err(err) => state.responder.from_error(&err),
    };

    Ok(response)
}

async fn dispatch(
    state: &AppState,
    route: ColorRoute,
    request: &ApiGatewayProxyRequest,
) -> Result<ApiGatewayProxyResponse, ServiceError> {
    match route {
        ColorRoute::Submit => {
            let body = decoded_body(request)?;
            let submission = ColorSubmission::parse(&body)?;
            let outcome = state.service.submit(submission).await?;
            Ok(state.responder.outcome(outcome))
        }
        ColorRoute::Search => {
            let prefix = match query_param(request, &NAME_PARAMS) {
                Some(name) if name.trim().is_empty() => {
                    return Err(ServiceError::validation(MISSING_NAME))
                }
                Some(name) => Some(name.trim()),
                None => None,
            };
            let outcome = state.service.search(prefix).await?;
            Ok(state.responder.outcome(outcome))
        }
    }
}
