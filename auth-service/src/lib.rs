//! Sign-up, login and password lifecycle over a Cognito user pool.

pub mod cognito;
pub mod config;
pub mod event_handler;
pub mod identity;
pub mod service;
