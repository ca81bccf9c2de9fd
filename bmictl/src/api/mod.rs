//! HTTP API: request handlers, wire models and request validation.

pub mod handlers;
pub mod models;
pub mod validation;
