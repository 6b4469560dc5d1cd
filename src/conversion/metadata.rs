//! Upstream response normalization
//!
//! This module converts AlphaFold DB, RCSB PDB and UniProt payloads into the
//! viewer's [`StructureMetadata`] and resolution shapes.

use crate::core::constants::PREDICTED_METHOD;
use crate::models::api::{StructureMetadata, StructureSource};
use crate::models::upstream::{AlphaFoldPrediction, RcsbEntry, RcsbPolymerEntity, UniProtHit};
use tracing::warn;

/// Column holding the accession in a UniProtKB TSV response
const UNIPROT_ENTRY_COLUMN: &str = "Entry";
const UNIPROT_NAME_COLUMN: &str = "Protein names";
const UNIPROT_ORGANISM_COLUMN: &str = "Organism";

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Convert an AlphaFold DB prediction to structure metadata
///
/// # Arguments
///
/// * `accession` - The UniProt accession the prediction was requested for
/// * `prediction` - First entry of the prediction API response
/// * `model_url` - The model file URL served to the viewer
pub fn convert_alphafold_prediction(
    accession: &str,
    prediction: &AlphaFoldPrediction,
    model_url: &str,
) -> StructureMetadata {
    let id = non_empty(prediction.uniprot_accession.as_deref())
        .unwrap_or_else(|| accession.to_string());

    let mut metadata = StructureMetadata::new(id, StructureSource::AlphaFold, model_url);
    metadata.name = non_empty(prediction.uniprot_description.as_deref());
    metadata.organism = non_empty(prediction.organism_scientific_name.as_deref());
    metadata.gene = non_empty(prediction.gene.as_deref());
    metadata.method = Some(PREDICTED_METHOD.to_string());
    metadata.confidence = prediction.global_metric_value;
    metadata.sequence_length = prediction
        .uniprot_sequence
        .as_deref()
        .map(|s| s.trim().len())
        .filter(|&len| len > 0);
    metadata
}

/// Convert an RCSB entry (and optionally its first polymer entity) to
/// structure metadata
pub fn convert_rcsb_entry(
    id: &str,
    entry: &RcsbEntry,
    entity: Option<&RcsbPolymerEntity>,
    model_url: &str,
) -> StructureMetadata {
    let mut metadata = StructureMetadata::new(id, StructureSource::Pdb, model_url);

    metadata.name = non_empty(entry.structure.as_ref().and_then(|s| s.title.as_deref()));
    metadata.method = entry
        .exptl
        .iter()
        .find_map(|e| non_empty(e.method.as_deref()));
    metadata.resolution = entry
        .rcsb_entry_info
        .as_ref()
        .and_then(|info| info.resolution_combined.as_ref())
        .and_then(|r| r.first().copied());

    if let Some(entity) = entity {
        let organism = entity.rcsb_entity_source_organism.first();
        metadata.organism = non_empty(organism.and_then(|o| o.scientific_name.as_deref()));
        metadata.gene = organism
            .and_then(|o| o.rcsb_gene_name.first())
            .and_then(|g| non_empty(Some(g.value.as_str())));
        metadata.sequence_length = entity
            .entity_poly
            .as_ref()
            .and_then(|p| p.rcsb_sample_sequence_length);
    }

    metadata
}

/// Parse the first hit out of a UniProtKB TSV search response
///
/// Returns `None` when the response has no data rows or lacks the `Entry`
/// column.
pub fn parse_uniprot_tsv(body: &str) -> Option<UniProtHit> {
    let mut lines = body.trim().lines();
    let header: Vec<&str> = lines.next()?.split('\t').collect();
    let first_row = lines.next()?;

    let Some(entry_idx) = header.iter().position(|c| *c == UNIPROT_ENTRY_COLUMN) else {
        warn!("UniProt response missing 'Entry' column: {:?}", header);
        return None;
    };

    let row: Vec<&str> = first_row.split('\t').collect();
    let column = |name: &str| {
        header
            .iter()
            .position(|c| *c == name)
            .and_then(|idx| non_empty(row.get(idx).copied()))
    };

    let accession = non_empty(row.get(entry_idx).copied())?;

    Some(UniProtHit {
        accession: accession.to_uppercase(),
        protein_name: column(UNIPROT_NAME_COLUMN),
        organism: column(UNIPROT_ORGANISM_COLUMN),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MODEL_URL: &str = "https://alphafold.ebi.ac.uk/files/AF-P69905-F1-model_v4.pdb";

    #[test]
    fn test_convert_alphafold_prediction() {
        let prediction: AlphaFoldPrediction = serde_json::from_value(json!({
            "entryId": "AF-P69905-F1",
            "gene": "HBA1",
            "uniprotAccession": "P69905",
            "uniprotDescription": "Hemoglobin subunit alpha",
            "organismScientificName": "Homo sapiens",
            "globalMetricValue": 96.88,
            "uniprotSequence": "MVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHF",
            "latestVersion": 4
        }))
        .unwrap();

        let metadata = convert_alphafold_prediction("p69905", &prediction, MODEL_URL);
        assert_eq!(metadata.id, "P69905");
        assert_eq!(metadata.source, StructureSource::AlphaFold);
        assert_eq!(metadata.name.as_deref(), Some("Hemoglobin subunit alpha"));
        assert_eq!(metadata.organism.as_deref(), Some("Homo sapiens"));
        assert_eq!(metadata.gene.as_deref(), Some("HBA1"));
        assert_eq!(metadata.method.as_deref(), Some(PREDICTED_METHOD));
        assert_eq!(metadata.confidence, Some(96.88));
        assert_eq!(metadata.sequence_length, Some(47));
        assert_eq!(metadata.resolution, None);
        assert_eq!(metadata.model_url, MODEL_URL);
    }

    #[test]
    fn test_convert_alphafold_prediction_sparse() {
        let prediction: AlphaFoldPrediction =
            serde_json::from_value(json!({ "gene": "" })).unwrap();

        let metadata = convert_alphafold_prediction("Q8W3K0", &prediction, MODEL_URL);
        assert_eq!(metadata.id, "Q8W3K0");
        assert_eq!(metadata.gene, None);
        assert_eq!(metadata.sequence_length, None);
    }

    #[test]
    fn test_convert_rcsb_entry() {
        let entry: RcsbEntry = serde_json::from_value(json!({
            "struct": { "title": "THE CRYSTAL STRUCTURE OF HUMAN DEOXYHAEMOGLOBIN" },
            "exptl": [{ "method": "X-RAY DIFFRACTION" }],
            "rcsb_entry_info": { "resolution_combined": [1.74] }
        }))
        .unwrap();
        let entity: RcsbPolymerEntity = serde_json::from_value(json!({
            "rcsb_entity_source_organism": [{
                "scientific_name": "Homo sapiens",
                "rcsb_gene_name": [{ "value": "HBA1", "provenance_source": "UniProt" }]
            }],
            "entity_poly": { "rcsb_sample_sequence_length": 141 }
        }))
        .unwrap();

        let metadata = convert_rcsb_entry(
            "4HHB",
            &entry,
            Some(&entity),
            "https://files.rcsb.org/download/4HHB.pdb",
        );
        assert_eq!(metadata.source, StructureSource::Pdb);
        assert_eq!(
            metadata.name.as_deref(),
            Some("THE CRYSTAL STRUCTURE OF HUMAN DEOXYHAEMOGLOBIN")
        );
        assert_eq!(metadata.method.as_deref(), Some("X-RAY DIFFRACTION"));
        assert_eq!(metadata.resolution, Some(1.74));
        assert_eq!(metadata.organism.as_deref(), Some("Homo sapiens"));
        assert_eq!(metadata.gene.as_deref(), Some("HBA1"));
        assert_eq!(metadata.sequence_length, Some(141));
        assert_eq!(metadata.confidence, None);
    }

    #[test]
    fn test_convert_rcsb_entry_without_entity() {
        let entry: RcsbEntry = serde_json::from_value(json!({
            "exptl": [{ "method": "SOLUTION NMR" }]
        }))
        .unwrap();

        let metadata =
            convert_rcsb_entry("1A2B", &entry, None, "https://files.rcsb.org/download/1A2B.pdb");
        assert_eq!(metadata.method.as_deref(), Some("SOLUTION NMR"));
        assert_eq!(metadata.resolution, None);
        assert_eq!(metadata.organism, None);
    }

    #[test]
    fn test_parse_uniprot_tsv() {
        let body = "Entry\tProtein names\tOrganism\nP01308\tInsulin\tHomo sapiens (Human)\n";
        let hit = parse_uniprot_tsv(body).unwrap();
        assert_eq!(hit.accession, "P01308");
        assert_eq!(hit.protein_name.as_deref(), Some("Insulin"));
        assert_eq!(hit.organism.as_deref(), Some("Homo sapiens (Human)"));
    }

    #[test]
    fn test_parse_uniprot_tsv_reordered_columns() {
        let body = "Organism\tEntry\nHomo sapiens (Human)\tp05067";
        let hit = parse_uniprot_tsv(body).unwrap();
        assert_eq!(hit.accession, "P05067");
        assert_eq!(hit.protein_name, None);
    }

    #[test]
    fn test_parse_uniprot_tsv_no_hits() {
        assert_eq!(parse_uniprot_tsv("Entry\tProtein names\tOrganism\n"), None);
        assert_eq!(parse_uniprot_tsv(""), None);
    }

    #[test]
    fn test_parse_uniprot_tsv_missing_entry_column() {
        assert_eq!(parse_uniprot_tsv("Accession\tName\nP01308\tInsulin"), None);
    }
}
