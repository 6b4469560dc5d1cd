//! AlphaFold DB provider implementation

use crate::conversion::metadata::convert_alphafold_prediction;
use crate::core::client::UpstreamClient;
use crate::core::provider::{ProviderError, StructureProvider};
use crate::core::query::build_afdb_model_url;
use crate::models::api::{ModelFormat, StructureMetadata, StructureSource};
use crate::models::upstream::AlphaFoldPrediction;
use async_trait::async_trait;
use tracing::debug;

/// AlphaFold DB provider for predicted models
pub struct AlphaFoldProvider {
    client: UpstreamClient,
    api_url: String,
    files_url: String,
}

impl AlphaFoldProvider {
    /// Create a new AlphaFold DB provider
    ///
    /// # Arguments
    ///
    /// * `client` - Shared upstream HTTP client
    /// * `api_url` - Base URL of the prediction API
    /// * `files_url` - Base URL model files are served from
    pub fn new(client: UpstreamClient, api_url: String, files_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            files_url,
        }
    }
}

#[async_trait]
impl StructureProvider for AlphaFoldProvider {
    fn source(&self) -> StructureSource {
        StructureSource::AlphaFold
    }

    fn model_url_for(&self, id: &str, format: ModelFormat) -> String {
        build_afdb_model_url(&self.files_url, id, format)
    }

    async fn fetch_metadata(&self, id: &str) -> Result<StructureMetadata, ProviderError> {
        let accession = id.trim().to_uppercase();
        let url = format!("{}/api/prediction/{}", self.api_url, accession);

        let predictions: Vec<AlphaFoldPrediction> = self.client.get_json(&url, &[]).await?;
        let prediction = predictions.first().ok_or_else(|| {
            ProviderError::NotFound(format!("No AlphaFold prediction for {accession}"))
        })?;

        debug!(
            "AlphaFold prediction for {}: entry={:?}",
            accession, prediction.entry_id
        );

        Ok(convert_alphafold_prediction(
            &accession,
            prediction,
            &self.model_url(&accession),
        ))
    }

    async fn model_exists(&self, url: &str) -> Result<bool, ProviderError> {
        let status = self.client.head_status(url).await?;
        Ok(!(status.is_client_error() || status.is_server_error()))
    }

    fn provider_name(&self) -> &str {
        "AlphaFold DB"
    }
}
