//! HTTP API: routes, handlers, errors and middleware

pub mod endpoints;
pub mod error;
pub mod middleware;
