//! The `{statusCode, data?, message?}` envelope and the formatters that put
//! it on the wire.

use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use http::StatusCode;
use serde::Serialize;
use tracing::{error, warn};

use crate::cors::Cors;
use crate::error::ServiceError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

const FALLBACK_BODY: &str = r#"{"statusCode":500,"message":"Internal server error"}"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What a service hands back to the handler: a payload and the status it
/// should be reported with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub data: T,
    pub status: StatusCode,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }
}

/// Builds gateway responses that all share one CORS header set.
#[derive(Debug, Clone)]
pub struct Responder {
    cors: Cors,
}

impl Responder {
    pub fn new(cors: Cors) -> Self {
        Self { cors }
    }

    pub fn success<T: Serialize>(&self, data: T, status: StatusCode) -> ApiGatewayProxyResponse {
        self.render(
            status,
            &Envelope {
                status_code: status.as_u16(),
                data: Some(data),
                message: None,
            },
        )
    }

    pub fn outcome<T: Serialize>(&self, outcome: Outcome<T>) -> ApiGatewayProxyResponse {
        self.success(outcome.data, outcome.status)
    }

    /// Status-only `{statusCode: 200}` reply, used for preflight.
    pub fn acknowledge(&self) -> ApiGatewayProxyResponse {
        self.render::<()>(
            StatusCode::OK,
            &Envelope {
                status_code: StatusCode::OK.as_u16(),
                data: None,
                message: None,
            },
        )
    }

    pub fn client_error(&self, message: &str, status: StatusCode) -> ApiGatewayProxyResponse {
        self.render::<()>(
            status,
            &Envelope {
                status_code: status.as_u16(),
                data: None,
                message: Some(message.to_string()),
            },
        )
    }

    /// Logs `err` and answers 500 with a fixed message.
    pub fn server_error(&self, err: &dyn std::error::Error) -> ApiGatewayProxyResponse {
        error!(error = %err, source = ?err.source(), "request failed");
        self.render::<()>(
            StatusCode::INTERNAL_SERVER_ERROR,
            &Envelope {
                status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                data: None,
                message: Some(INTERNAL_ERROR_MESSAGE.to_string()),
            },
        )
    }

    pub fn from_error(&self, err: &ServiceError) -> ApiGatewayProxyResponse {
        if err.is_client_error() {
            warn!(status = err.status().as_u16(), error = %err, "rejected request");
            self.client_error(&err.to_string(), err.status())
        } else {
            self.server_error(err)
        }
    }

    fn render<T: Serialize>(
        &self,
        status: StatusCode,
        envelope: &Envelope<T>,
    ) -> ApiGatewayProxyResponse {
        let (status, body) = match serde_json::to_string(envelope) {
            Ok(body) => (status, body),
            Err(err) => {
                error!(error = %err, "failed to serialize response envelope");
                (StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_BODY.to_string())
            }
        };

        let mut response = ApiGatewayProxyResponse::default();
        response.status_code = i64::from(status.as_u16());
        response.headers = self.cors.headers();
        response.body = Some(Body::Text(body));
        response
    }
}
