//! Provider abstraction layer for structure databases
//!
//! This module defines a common trait for the databases that serve 3D models
//! (AlphaFold DB, RCSB PDB) and the error type shared by every upstream
//! client.

use crate::models::api::{ModelFormat, StructureMetadata, StructureSource};
use async_trait::async_trait;
use thiserror::Error;

/// Error types for provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// Trait for databases serving structure models
#[async_trait]
pub trait StructureProvider: Send + Sync {
    /// Database this provider serves
    fn source(&self) -> StructureSource;

    /// URL of the model file for `id` in `format`
    fn model_url_for(&self, id: &str, format: ModelFormat) -> String;

    /// URL of the PDB-format model file, the format handed to the viewer
    fn model_url(&self, id: &str) -> String {
        self.model_url_for(id, ModelFormat::Pdb)
    }

    /// Fetch normalized metadata for `id`
    async fn fetch_metadata(&self, id: &str) -> Result<StructureMetadata, ProviderError>;

    /// Check whether a model file exists
    ///
    /// Returns `Ok(false)` when the upstream answers with an error status and
    /// `Err` when it cannot be reached at all.
    async fn model_exists(&self, url: &str) -> Result<bool, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}
