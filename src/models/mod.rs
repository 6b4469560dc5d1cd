//! API data models
//!
//! This module contains data structures for the viewer API and the upstream
//! structure databases.

pub mod api;
pub mod upstream;
