//! Conversion between upstream payloads and viewer responses

pub mod export;
pub mod metadata;
