//! Client-facing API data models
//!
//! This module defines the request and response bodies served by the viewer
//! backend.

use crate::core::constants::source;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database a structure model comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureSource {
    AlphaFold,
    Pdb,
}

impl StructureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureSource::AlphaFold => source::ALPHAFOLD,
            StructureSource::Pdb => source::PDB,
        }
    }

    /// Human readable database name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            StructureSource::AlphaFold => "AlphaFold",
            StructureSource::Pdb => "PDB",
        }
    }
}

impl fmt::Display for StructureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate file format of a structure model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Pdb,
    Cif,
}

impl ModelFormat {
    /// File extension, also used as the `format` value sent to the viewer
    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Pdb => "pdb",
            ModelFormat::Cif => "cif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ModelFormat::Pdb => "chemical/x-pdb",
            ModelFormat::Cif => "chemical/x-mmcif",
        }
    }
}

/// POST /search request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Normalized structure metadata
///
/// Unknown fields are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureMetadata {
    pub id: String,
    pub source: StructureSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    /// Resolution in Ångström (experimental structures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Mean pLDDT (predicted models only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_length: Option<usize>,
    pub model_url: String,
}

impl StructureMetadata {
    /// Metadata with only the identity fields set
    pub fn new(id: impl Into<String>, source: StructureSource, model_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source,
            name: None,
            organism: None,
            gene: None,
            resolution: None,
            method: None,
            confidence: None,
            sequence_length: None,
            model_url: model_url.into(),
        }
    }
}

/// POST /search response body
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub query_type: String,
    pub source: StructureSource,
    pub id: String,
    /// UniProt accession, when the model is an AlphaFold prediction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    /// Model URL under its historical field name
    pub pdb_url: String,
    pub model_url: String,
    pub proxy_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StructureMetadata>,
}

/// GET /api/structure/{id} response body
#[derive(Debug, Clone, Serialize)]
pub struct StructureData {
    pub id: String,
    pub source: StructureSource,
    pub format: ModelFormat,
    pub model_url: String,
    pub proxy_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StructureMetadata>,
}

/// Query string carrying a structure identifier
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// GET /api/export query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub id: Option<String>,
    pub format: Option<String>,
}

/// GET /proxy query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}
