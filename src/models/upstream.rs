//! Upstream API data models
//!
//! Partial response shapes for the AlphaFold DB, RCSB PDB and UniProt REST
//! APIs. Only the fields the viewer reads are declared; everything else in
//! the upstream payload is ignored.

use serde::Deserialize;

/// One entry of `GET /api/prediction/{accession}` on AlphaFold DB
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaFoldPrediction {
    #[serde(default)]
    pub entry_id: Option<String>,
    #[serde(default)]
    pub gene: Option<String>,
    #[serde(default)]
    pub uniprot_accession: Option<String>,
    #[serde(default)]
    pub uniprot_description: Option<String>,
    #[serde(default)]
    pub organism_scientific_name: Option<String>,
    /// Mean pLDDT over the model
    #[serde(default)]
    pub global_metric_value: Option<f64>,
    #[serde(default)]
    pub uniprot_sequence: Option<String>,
}

/// `GET /rest/v1/core/entry/{id}` on the RCSB data API
#[derive(Debug, Clone, Deserialize)]
pub struct RcsbEntry {
    #[serde(default, rename = "struct")]
    pub structure: Option<RcsbStruct>,
    #[serde(default)]
    pub exptl: Vec<RcsbExperiment>,
    #[serde(default)]
    pub rcsb_entry_info: Option<RcsbEntryInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RcsbStruct {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RcsbExperiment {
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RcsbEntryInfo {
    #[serde(default)]
    pub resolution_combined: Option<Vec<f64>>,
}

/// `GET /rest/v1/core/polymer_entity/{id}/{entity}` on the RCSB data API
#[derive(Debug, Clone, Deserialize)]
pub struct RcsbPolymerEntity {
    #[serde(default)]
    pub rcsb_entity_source_organism: Vec<RcsbSourceOrganism>,
    #[serde(default)]
    pub entity_poly: Option<RcsbEntityPoly>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RcsbSourceOrganism {
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub rcsb_gene_name: Vec<RcsbGeneName>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RcsbGeneName {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RcsbEntityPoly {
    #[serde(default)]
    pub rcsb_sample_sequence_length: Option<usize>,
}

/// First hit of a UniProtKB TSV search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniProtHit {
    pub accession: String,
    pub protein_name: Option<String>,
    pub organism: Option<String>,
}
