//! RCSB Protein Data Bank provider implementation

use crate::conversion::metadata::convert_rcsb_entry;
use crate::core::client::UpstreamClient;
use crate::core::provider::{ProviderError, StructureProvider};
use crate::core::query::build_pdb_url;
use crate::models::api::{ModelFormat, StructureMetadata, StructureSource};
use crate::models::upstream::{RcsbEntry, RcsbPolymerEntity};
use async_trait::async_trait;
use tracing::warn;

/// RCSB PDB provider for experimentally determined structures
pub struct PdbProvider {
    client: UpstreamClient,
    data_url: String,
    files_url: String,
}

impl PdbProvider {
    /// Create a new RCSB PDB provider
    ///
    /// # Arguments
    ///
    /// * `client` - Shared upstream HTTP client
    /// * `data_url` - Base URL of the RCSB data API
    /// * `files_url` - Base URL of the RCSB file download service
    pub fn new(client: UpstreamClient, data_url: String, files_url: String) -> Self {
        Self {
            client,
            data_url: data_url.trim_end_matches('/').to_string(),
            files_url,
        }
    }

    /// Fetch the first polymer entity, which carries organism and gene
    ///
    /// Failure only costs those fields, so it is logged and swallowed.
    async fn fetch_first_entity(&self, id: &str) -> Option<RcsbPolymerEntity> {
        let url = format!("{}/rest/v1/core/polymer_entity/{}/1", self.data_url, id);
        match self.client.get_json(&url, &[]).await {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!("RCSB polymer entity lookup failed for {}: {}", id, e);
                None
            }
        }
    }
}

#[async_trait]
impl StructureProvider for PdbProvider {
    fn source(&self) -> StructureSource {
        StructureSource::Pdb
    }

    fn model_url_for(&self, id: &str, format: ModelFormat) -> String {
        build_pdb_url(&self.files_url, id, format)
    }

    async fn fetch_metadata(&self, id: &str) -> Result<StructureMetadata, ProviderError> {
        let id = id.trim().to_uppercase();
        let url = format!("{}/rest/v1/core/entry/{}", self.data_url, id);

        let (entry, entity) = tokio::join!(
            self.client.get_json::<RcsbEntry>(&url, &[]),
            self.fetch_first_entity(&id),
        );

        Ok(convert_rcsb_entry(
            &id,
            &entry?,
            entity.as_ref(),
            &self.model_url(&id),
        ))
    }

    async fn model_exists(&self, url: &str) -> Result<bool, ProviderError> {
        let status = self.client.head_status(url).await?;
        Ok(!(status.is_client_error() || status.is_server_error()))
    }

    fn provider_name(&self) -> &str {
        "RCSB PDB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> PdbProvider {
        PdbProvider::new(UpstreamClient::new(5).unwrap(), server.uri(), server.uri())
    }

    async fn mount_entry(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/core/entry/4HHB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "struct": { "title": "THE CRYSTAL STRUCTURE OF HUMAN DEOXYHAEMOGLOBIN" },
                "exptl": [{ "method": "X-RAY DIFFRACTION" }],
                "rcsb_entry_info": { "resolution_combined": [1.74] }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_metadata_with_entity() {
        let server = MockServer::start().await;
        mount_entry(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/core/polymer_entity/4HHB/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rcsb_entity_source_organism": [{ "scientific_name": "Homo sapiens" }]
            })))
            .mount(&server)
            .await;

        let metadata = provider(&server).fetch_metadata("4hhb").await.unwrap();
        assert_eq!(metadata.id, "4HHB");
        assert_eq!(metadata.resolution, Some(1.74));
        assert_eq!(metadata.organism.as_deref(), Some("Homo sapiens"));
        assert_eq!(
            metadata.model_url,
            format!("{}/download/4HHB.pdb", server.uri())
        );
    }

    #[tokio::test]
    async fn test_fetch_metadata_entity_failure_is_soft() {
        let server = MockServer::start().await;
        mount_entry(&server).await;

        let metadata = provider(&server).fetch_metadata("4HHB").await.unwrap();
        assert_eq!(metadata.method.as_deref(), Some("X-RAY DIFFRACTION"));
        assert_eq!(metadata.organism, None);
    }

    #[tokio::test]
    async fn test_fetch_metadata_unknown_entry() {
        let server = MockServer::start().await;

        let result = provider(&server).fetch_metadata("9ZZZ").await;
        assert!(matches!(result, Err(ProviderError::NotFound(_))));
    }

    #[test]
    fn test_model_url_for_cif() {
        let provider = PdbProvider::new(
            UpstreamClient::new(5).unwrap(),
            "https://data.rcsb.org".to_string(),
            "https://files.rcsb.org".to_string(),
        );
        assert_eq!(
            provider.model_url_for("1a2b", ModelFormat::Cif),
            "https://files.rcsb.org/download/1A2B.cif"
        );
    }
}
