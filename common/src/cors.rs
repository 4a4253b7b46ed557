use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE,
};
use http::{HeaderMap, HeaderValue, Method};

use crate::config::ALLOWED_ORIGIN_VAR;
use crate::error::ConfigError;

pub const ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,X-Amz-User-Agent";
pub const MAX_AGE_SECONDS: u32 = 300;

/// The header set attached to every response a function returns.
///
/// An empty origin is accepted and sent as-is; browsers will then refuse
/// cross-origin reads, so deployments must set the origin explicitly.
#[derive(Debug, Clone)]
pub struct Cors {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
}

impl Cors {
    pub fn new(origin: &str, methods: &[Method]) -> Result<Self, ConfigError> {
        let allow_origin =
            HeaderValue::from_str(origin).map_err(|err| ConfigError::Invalid {
                var: ALLOWED_ORIGIN_VAR,
                reason: err.to_string(),
            })?;
        let methods = methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let allow_methods =
            HeaderValue::from_str(&methods).map_err(|err| ConfigError::Header {
                header: "access-control-allow-methods",
                reason: format!("{methods:?}: {err}"),
            })?;

        Ok(Self {
            allow_origin,
            allow_methods,
        })
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(MAX_AGE_SECONDS));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_origin_and_methods() {
        let cors = Cors::new(
            "https://example.com",
            &[Method::GET, Method::POST, Method::OPTIONS],
        )
        .unwrap();
        let headers = cors.headers();

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://example.com");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET,POST,OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "300");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn empty_origin_is_sent_verbatim() {
        let cors = Cors::new("", &[Method::OPTIONS]).unwrap();
        assert_eq!(cors.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "");
    }

    #[test]
    fn extension_methods_are_listed() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let cors = Cors::new("https://example.com", &[purge, Method::OPTIONS]).unwrap();
        assert_eq!(cors.headers()[ACCESS_CONTROL_ALLOW_METHODS], "PURGE,OPTIONS");
    }

    #[test]
    fn origin_with_control_characters_is_rejected() {
        let err = Cors::new("https://example.com\n", &[Method::OPTIONS]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: ALLOWED_ORIGIN_VAR,
                ..
            }
        ));
    }
}
