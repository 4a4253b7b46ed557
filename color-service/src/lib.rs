//! Color preference submission and search behind API Gateway.

pub mod config;
pub mod event_handler;
pub mod model;
pub mod service;
pub mod store;
