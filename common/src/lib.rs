//! Gateway plumbing shared by the palette functions: CORS headers, the
//! response envelope, typed errors, body decoding and the route table.

pub mod config;
pub mod cors;
pub mod envelope;
pub mod error;
pub mod request;
pub mod router;

pub use cors::Cors;
pub use envelope::{Outcome, Responder};
pub use error::{ConfigError, ServiceError};
pub use router::{Resolved, Router};
