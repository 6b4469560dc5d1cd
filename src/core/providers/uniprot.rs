//! UniProt name resolution

use crate::conversion::metadata::parse_uniprot_tsv;
use crate::core::client::UpstreamClient;
use crate::core::provider::ProviderError;
use crate::models::upstream::UniProtHit;
use tracing::{debug, warn};

/// Fields requested from the UniProtKB search endpoint
const SEARCH_FIELDS: &str = "accession,protein_name,organism_name";

/// UniProt REST client resolving protein names to accessions
pub struct UniProtClient {
    client: UpstreamClient,
    api_url: String,
}

impl UniProtClient {
    pub fn new(client: UpstreamClient, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search UniProtKB for `name` and return the best hit
    ///
    /// # Errors
    ///
    /// Returns ProviderError when UniProt cannot be reached or rejects the
    /// query. An empty result set is `Ok(None)`.
    pub async fn lookup_by_name(&self, name: &str) -> Result<Option<UniProtHit>, ProviderError> {
        let url = format!("{}/uniprotkb/search", self.api_url);
        let body = self
            .client
            .get_text(
                &url,
                &[
                    ("query", name),
                    ("format", "tsv"),
                    ("fields", SEARCH_FIELDS),
                    ("size", "1"),
                ],
            )
            .await?;

        Ok(parse_uniprot_tsv(&body))
    }

    /// Resolve a protein name to a UniProt accession
    ///
    /// Upstream failures are logged and reported as unresolved.
    pub async fn resolve_name(&self, name: &str) -> Option<String> {
        match self.lookup_by_name(name).await {
            Ok(Some(hit)) => {
                debug!(
                    "Resolved '{}' to {} ({:?}, {:?})",
                    name, hit.accession, hit.protein_name, hit.organism
                );
                Some(hit.accession)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("UniProt lookup failed for '{}': {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> UniProtClient {
        UniProtClient::new(UpstreamClient::new(5).unwrap(), server.uri())
    }

    #[tokio::test]
    async fn test_resolve_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/search"))
            .and(query_param("query", "insulin"))
            .and(query_param("format", "tsv"))
            .and(query_param("size", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "Entry\tProtein names\tOrganism\nP01308\tInsulin\tHomo sapiens (Human)\n",
            ))
            .mount(&server)
            .await;

        assert_eq!(
            client(&server).resolve_name("insulin").await,
            Some("P01308".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_name_no_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Entry\tProtein names\tOrganism\n"),
            )
            .mount(&server)
            .await;

        assert_eq!(client(&server).resolve_name("zzzz").await, None);
    }

    #[tokio::test]
    async fn test_lookup_reports_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/search"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid query"))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(
            client.lookup_by_name("((").await,
            Err(ProviderError::BadRequest(_))
        ));
        assert_eq!(client.resolve_name("((").await, None);
    }
}
