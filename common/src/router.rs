//! Route table shared by the functions.
//!
//! Each function declares its routes once as data; resolving an event yields
//! either the preflight marker or the operation to run.

use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use http::Method;

use crate::error::ServiceError;
use crate::request::{query_param, request_path};

pub const ACTION_PARAM: &str = "action";
pub const INVALID_ACTION: &str = "Invalid action";

#[derive(Debug, Clone)]
struct Route<Op> {
    path: String,
    method: Method,
    action: Option<&'static str>,
    op: Op,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<Op> {
    Preflight,
    Operation(Op),
}

#[derive(Debug, Clone)]
pub struct Router<Op> {
    routes: Vec<Route<Op>>,
}

impl<Op> Default for Router<Op> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<Op: Copy> Router<Op> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: impl Into<String>, method: Method, op: Op) -> Self {
        self.routes.push(Route {
            path: path.into(),
            method,
            action: None,
            op,
        });
        self
    }

    /// Route selected by the `action` query parameter as well as method and path.
    pub fn action(
        mut self,
        path: impl Into<String>,
        method: Method,
        action: &'static str,
        op: Op,
    ) -> Self {
        self.routes.push(Route {
            path: path.into(),
            method,
            action: Some(action),
            op,
        });
        self
    }

    /// Methods the table serves, in declaration order, followed by `OPTIONS`.
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for route in &self.routes {
            if !methods.contains(&route.method) {
                methods.push(route.method.clone());
            }
        }
        if !methods.contains(&Method::OPTIONS) {
            methods.push(Method::OPTIONS);
        }
        methods
    }

    pub fn resolve(&self, event: &ApiGatewayProxyRequest) -> Result<Resolved<Op>, ServiceError> {
        if event.http_method == Method::OPTIONS {
            return Ok(Resolved::Preflight);
        }

        let path = request_path(event)
            .ok_or_else(|| ServiceError::InvalidEvent("event has no path".to_string()))?;

        let mut on_path = self.routes.iter().filter(|r| r.path == path).peekable();
        if on_path.peek().is_none() {
            return Err(ServiceError::NotFound);
        }

        let candidates: Vec<&Route<Op>> = on_path.filter(|r| r.method == event.http_method).collect();
        if candidates.is_empty() {
            return Err(ServiceError::MethodNotAllowed);
        }

        let action = query_param(event, &[ACTION_PARAM]);
        candidates
            .iter()
            .find(|r| r.action.is_none() || r.action == action)
            .map(|r| Resolved::Operation(r.op))
            .ok_or_else(|| ServiceError::validation(INVALID_ACTION))
    }
}
