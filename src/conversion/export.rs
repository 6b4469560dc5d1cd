//! Export document rendering
//!
//! Builds the downloadable forms of a structure: the raw coordinate file in
//! PDB or mmCIF format, or a JSON document describing its metadata.

use crate::models::api::{ModelFormat, StructureMetadata};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// Download format requested from `/api/export`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdb,
    Cif,
    Json,
}

impl ExportFormat {
    /// Parse a `format` query value; a missing value means PDB
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("pdb") => Some(ExportFormat::Pdb),
            Some("cif") | Some("mmcif") => Some(ExportFormat::Cif),
            Some("json") => Some(ExportFormat::Json),
            _ => None,
        }
    }

    /// Coordinate format backing this export, `None` for metadata exports
    pub fn model_format(&self) -> Option<ModelFormat> {
        match self {
            ExportFormat::Pdb => Some(ModelFormat::Pdb),
            ExportFormat::Cif => Some(ModelFormat::Cif),
            ExportFormat::Json => None,
        }
    }
}

/// File name offered to the browser for an export
pub fn attachment_filename(id: &str, format: ExportFormat) -> String {
    let id = id.trim().to_uppercase();
    match format {
        ExportFormat::Pdb => format!("{id}.pdb"),
        ExportFormat::Cif => format!("{id}.cif"),
        ExportFormat::Json => format!("{id}_metadata.json"),
    }
}

/// `Content-Disposition` header value for an attachment
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

/// Render the JSON metadata export document
pub fn render_metadata_export(metadata: &StructureMetadata, exported_at: DateTime<Utc>) -> Value {
    json!({
        "exported_at": exported_at.to_rfc3339(),
        "structure": metadata,
    })
}
