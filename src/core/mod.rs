//! Core application modules
//!
//! This module contains configuration, constants, logging, query
//! classification, caching and the upstream database clients.

pub mod cache;
pub mod client;
pub mod config;
pub mod constants;
pub mod logging;
pub mod provider;
pub mod providers;
pub mod query;
