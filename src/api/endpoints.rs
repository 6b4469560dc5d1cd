//! API endpoint handlers
//!
//! This module implements the HTTP endpoints of the structure viewer: the
//! viewer page, search, structure descriptors, metadata, export, the
//! structure file proxy and health checks.

use crate::api::error::{ApiError, ApiResult};
use crate::api::middleware::{cors_layer, tracing_layer};
use crate::conversion::export::{
    ExportFormat, attachment_filename, content_disposition, render_metadata_export,
};
use crate::core::cache::{ResponseCache, metadata_key, name_key};
use crate::core::client::UpstreamClient;
use crate::core::config::Config;
use crate::core::constants::message;
use crate::core::provider::{ProviderError, StructureProvider};
use crate::core::providers::{AlphaFoldProvider, PdbProvider, UniProtClient};
use crate::core::query::{QueryKind, classify, identify_structure};
use crate::models::api::{
    ExportQuery, IdQuery, ModelFormat, ProxyQuery, SearchRequest, SearchResponse, StructureData,
    StructureMetadata, StructureSource,
};
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Viewer page; `__BASE_PATH__` is replaced with the configured mount point
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Content type used when the upstream does not send one
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub alphafold: Arc<dyn StructureProvider>,
    pub pdb: Arc<dyn StructureProvider>,
    pub uniprot: Arc<UniProtClient>,
    /// Client with the longer download timeout, used for file streaming
    pub downloads: UpstreamClient,
    pub name_cache: Arc<ResponseCache<String>>,
    pub metadata_cache: Arc<ResponseCache<StructureMetadata>>,
}

impl AppState {
    /// Build the providers, clients and caches described by `config`
    pub fn new(config: Arc<Config>) -> Result<Self, ProviderError> {
        let api_client = UpstreamClient::new(config.request_timeout)?;
        let downloads =
            UpstreamClient::for_downloads(config.download_timeout, download_hosts(&config))?;
        let ttl = Duration::from_secs(config.cache_ttl_secs);

        Ok(Self {
            alphafold: Arc::new(AlphaFoldProvider::new(
                api_client.clone(),
                config.alphafold_api_url.clone(),
                config.alphafold_files_url.clone(),
            )),
            pdb: Arc::new(PdbProvider::new(
                api_client.clone(),
                config.rcsb_data_url.clone(),
                config.rcsb_files_url.clone(),
            )),
            uniprot: Arc::new(UniProtClient::new(api_client, config.uniprot_api_url.clone())),
            downloads,
            name_cache: Arc::new(ResponseCache::new(config.cache_capacity, ttl)),
            metadata_cache: Arc::new(ResponseCache::new(config.cache_capacity, ttl)),
            config,
        })
    }

    fn provider(&self, source: StructureSource) -> &Arc<dyn StructureProvider> {
        match source {
            StructureSource::AlphaFold => &self.alphafold,
            StructureSource::Pdb => &self.pdb,
        }
    }

    /// Same-origin proxy URL for an upstream model file
    fn proxy_url(&self, model_url: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(model_url.as_bytes()).collect();
        format!("{}/proxy?url={}", self.config.base_path, encoded)
    }

    /// Resolve a protein name through UniProt, memoizing successes
    async fn resolve_name(&self, name: &str) -> Option<String> {
        let key = name_key(name);
        if let Some(accession) = self.name_cache.get(&key) {
            debug!("Name cache hit for '{}'", name);
            return Some(accession);
        }

        let accession = self.uniprot.resolve_name(name).await?;
        self.name_cache.insert(key, accession.clone());
        Some(accession)
    }

    /// Fetch structure metadata, memoizing successes
    async fn metadata(
        &self,
        source: StructureSource,
        id: &str,
    ) -> Result<StructureMetadata, ProviderError> {
        let key = metadata_key(source, id);
        if let Some(metadata) = self.metadata_cache.get(&key) {
            debug!("Metadata cache hit for {}", key);
            return Ok(metadata);
        }

        let provider = self.provider(source);
        debug!(
            "Fetching {} metadata for {} from {} ({} cached)",
            provider.source(),
            id,
            provider.provider_name(),
            self.metadata_cache.len()
        );
        let metadata = provider.fetch_metadata(id).await?;
        self.metadata_cache.insert(key, metadata.clone());
        Ok(metadata)
    }
}

/// Hosts the download client may fetch from, including redirect targets
fn download_hosts(config: &Config) -> Vec<String> {
    let mut hosts = config.proxy_allowed_hosts.clone();
    for files_url in [&config.alphafold_files_url, &config.rcsb_files_url] {
        if let Some(host) = url::Url::parse(files_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            if !hosts.iter().any(|h| h.eq_ignore_ascii_case(&host)) {
                hosts.push(host);
            }
        }
    }
    hosts
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let routes = Router::new()
        .route("/", get(index))
        .route("/api/health", get(health_check))
        .route("/search", post(search))
        .route("/api/structure/{id}", get(structure))
        .route("/api/metadata", get(metadata))
        .route("/api/export", get(export))
        .route("/proxy", get(proxy))
        .nest_service("/static", ServeDir::new(&config.static_dir));

    // A nested "/" only matches the bare prefix, so the trailing-slash form
    // of the mount point gets its own route
    let app = if config.base_path.is_empty() {
        routes
    } else {
        Router::new()
            .route(&format!("{}/", config.base_path), get(index))
            .nest(&config.base_path, routes)
    };

    app.with_state(state)
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(tracing_layer())
}

/// GET / - Viewer page
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(INDEX_HTML.replace("__BASE_PATH__", &state.config.base_path))
}

/// GET /api/health - Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /search - Resolve a query to a structure model
///
/// Body: `{"query": "<UniProt ID, PDB ID or protein name>"}`. A body that is
/// not valid JSON is treated like one without a query.
async fn search(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<SearchResponse>> {
    let request: SearchRequest = serde_json::from_slice(&body).unwrap_or_default();
    let query = request.query.unwrap_or_default().trim().to_string();

    let kind = classify(&query).ok_or_else(|| ApiError::bad_request(message::MISSING_QUERY))?;

    let request_id = Uuid::new_v4();
    info!(
        "🔎 Search request {}: query={:?}, type={}",
        request_id,
        query,
        kind.as_str()
    );

    let (source, id, accession) = match kind {
        QueryKind::Sequence => {
            return Err(ApiError::bad_request(message::SEQUENCE_UNSUPPORTED));
        }
        QueryKind::Pdb => (StructureSource::Pdb, query.to_uppercase(), None),
        QueryKind::UniProt => {
            let accession = query.to_uppercase();
            (StructureSource::AlphaFold, accession.clone(), Some(accession))
        }
        QueryKind::Name => {
            let accession = state
                .resolve_name(&query)
                .await
                .ok_or_else(|| ApiError::not_found(message::UNRESOLVED_NAME))?;
            (StructureSource::AlphaFold, accession.clone(), Some(accession))
        }
    };

    let provider = state.provider(source);
    let model_url = provider.model_url(&id);

    // An unreachable upstream skips the check; the client can still try the proxy.
    if state.config.verify_models {
        match provider.model_exists(&model_url).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(ApiError::not_found(format!(
                    "{} file not found for {}",
                    source.label(),
                    id
                )));
            }
            Err(e) => info!("Skipping HEAD check for {} due to {}", model_url, e),
        }
    }

    let metadata = match state.metadata(source, &id).await {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            warn!("Metadata unavailable for {} {}: {}", source, id, e);
            None
        }
    };

    info!(
        "✅ Search request {} resolved to {} {}",
        request_id, source, id
    );

    Ok(Json(SearchResponse {
        query: query.clone(),
        query_type: kind.as_str().to_string(),
        source,
        id,
        accession,
        pdb_url: model_url.clone(),
        proxy_url: state.proxy_url(&model_url),
        model_url,
        metadata,
    }))
}

/// Parse and classify a structure identifier from a request
fn require_structure_id(id: Option<&str>) -> ApiResult<(StructureSource, String)> {
    let id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request(message::MISSING_ID))?;

    identify_structure(id).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unrecognized structure identifier '{id}': expected a UniProt accession or PDB ID"
        ))
    })
}

/// GET /api/structure/{id} - Model location and metadata for one structure
async fn structure(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StructureData>> {
    let (source, id) = require_structure_id(Some(id.as_str()))?;
    let model_url = state.provider(source).model_url(&id);

    let metadata = match state.metadata(source, &id).await {
        Ok(metadata) => Some(metadata),
        Err(ProviderError::NotFound(detail)) => return Err(ApiError::NotFound(detail)),
        Err(e) => {
            warn!("Metadata unavailable for {} {}: {}", source, id, e);
            None
        }
    };

    Ok(Json(StructureData {
        proxy_url: state.proxy_url(&model_url),
        id,
        source,
        format: ModelFormat::Pdb,
        model_url,
        metadata,
    }))
}

/// GET /api/metadata?id= - Normalized metadata for one structure
async fn metadata(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<StructureMetadata>> {
    let Query(query) = query?;
    let (source, id) = require_structure_id(query.id.as_deref())?;
    Ok(Json(state.metadata(source, &id).await?))
}

/// GET /api/export?id=&format= - Download a model file or metadata document
async fn export(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let format = ExportFormat::parse(query.format.as_deref()).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unsupported export format '{}': expected pdb, cif or json",
            query.format.as_deref().unwrap_or_default()
        ))
    })?;
    let (source, id) = require_structure_id(query.id.as_deref())?;
    let disposition = content_disposition(&attachment_filename(&id, format));

    let Some(model_format) = format.model_format() else {
        let metadata = state.metadata(source, &id).await?;
        let document = render_metadata_export(&metadata, chrono::Utc::now());
        let body = serde_json::to_vec_pretty(&document)
            .map_err(|e| ApiError::Internal(format!("Failed to render export: {e}")))?;
        return Ok(attachment_response(
            Body::from(body),
            "application/json",
            &disposition,
        ));
    };

    let model_url = state.provider(source).model_url_for(&id, model_format);
    info!("📦 Exporting {} {} from {}", source, id, model_url);

    let upstream = state.downloads.get_raw(&model_url).await?;
    let status = upstream.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::not_found(format!(
            "{} file not found for {}",
            source.label(),
            id
        )));
    }
    if status.is_client_error() || status.is_server_error() {
        return Err(ApiError::UpstreamStatus(status.as_u16()));
    }

    Ok(attachment_response(
        Body::from_stream(upstream.bytes_stream()),
        model_format.content_type(),
        &disposition,
    ))
}

fn attachment_response(body: Body, content_type: &str, disposition: &str) -> Response {
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    if let Ok(value) = HeaderValue::from_str(disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// Validate a proxy target against the scheme and host allow-list
fn validate_proxy_target(raw_url: Option<&str>, allowed_hosts: &[String]) -> ApiResult<url::Url> {
    let raw_url = raw_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request(message::MISSING_URL))?;

    let parsed =
        url::Url::parse(raw_url).map_err(|_| ApiError::bad_request(message::INVALID_URL))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::bad_request(message::UNSUPPORTED_SCHEME));
    }

    let host_allowed = parsed
        .host_str()
        .is_some_and(|host| allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)));
    if !host_allowed {
        return Err(ApiError::bad_request(message::HOST_NOT_ALLOWED));
    }

    Ok(parsed)
}

/// GET /proxy?url= - Stream a structure file from an allowed host
///
/// Lets the browser load models that the upstream does not serve with CORS
/// headers.
async fn proxy(
    State(state): State<AppState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let target = validate_proxy_target(query.url.as_deref(), &state.config.proxy_allowed_hosts)?;

    let upstream = state.downloads.get_raw(target.as_str()).await.map_err(|e| {
        warn!("Upstream fetch failed for {}: {}", target, e);
        ApiError::from(e)
    })?;

    let status = upstream.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(ApiError::UpstreamStatus(status.as_u16()));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}
