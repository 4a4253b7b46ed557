use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::Value;

use crate::error::ServiceError;

pub const MISSING_BODY: &str = "Missing request body";
pub const MISSING_FIELDS: &str = "Missing required fields";

/// Returns the request body as text, undoing the gateway's base64 wrapping.
pub fn decoded_body(event: &ApiGatewayProxyRequest) -> Result<String, ServiceError> {
    let raw = match event.body.as_deref() {
        Some(body) if !body.is_empty() => body,
        _ => return Err(ServiceError::validation(MISSING_BODY)),
    };

    if !event.is_base64_encoded {
        return Ok(raw.to_string());
    }

    let bytes = STANDARD
        .decode(raw)
        .map_err(|err| ServiceError::MalformedBody(format!("base64: {err}")))?;
    String::from_utf8(bytes).map_err(|err| ServiceError::MalformedBody(format!("utf-8: {err}")))
}

/// Parses a JSON object body. A well-formed document of the wrong shape is
/// the caller's fault; anything that is not JSON at all is not.
pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ServiceError> {
    let value: Value = serde_json::from_str(body).map_err(|err| match err.classify() {
        Category::Data => ServiceError::validation(MISSING_FIELDS),
        Category::Syntax | Category::Eof | Category::Io => {
            ServiceError::MalformedBody(err.to_string())
        }
    })?;

    // Derived struct impls also accept arrays, binding fields by position.
    if !value.is_object() {
        return Err(ServiceError::validation(MISSING_FIELDS));
    }
    serde_json::from_value(value).map_err(|_| ServiceError::validation(MISSING_FIELDS))
}

/// First value of the first query parameter present among `names`.
pub fn query_param<'a>(event: &'a ApiGatewayProxyRequest, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| event.query_string_parameters.first(name))
}

/// Normalized request path: trailing slashes dropped, root kept as `/`.
pub fn request_path(event: &ApiGatewayProxyRequest) -> Option<&str> {
    let path = event.path.as_deref()?;
    let trimmed = path.trim_end_matches('/');
    Some(if trimmed.is_empty() { "/" } else { trimmed })
}
