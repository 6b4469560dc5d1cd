//! Search query classification and structure URL construction
//!
//! A free-form query is classified as a UniProt accession, a PDB ID, an
//! amino-acid sequence, or a protein name. Identifiers are mapped onto the
//! database that serves their 3D model.

use crate::core::constants::{sequence, upstream};
use crate::models::api::{ModelFormat, StructureSource};
use regex::Regex;
use std::sync::LazyLock;

/// UniProt accession format, see <https://www.uniprot.org/help/accession_numbers>
static UNIPROT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9]([A-Z][A-Z0-9]{2}[0-9]){1,2})$")
        .expect("valid regex")
});

/// PDB IDs: a non-zero digit followed by three alphanumerics
static PDB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[1-9][A-Z0-9]{3}$").expect("valid regex"));

/// Kind of search term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    UniProt,
    Pdb,
    Sequence,
    Name,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::UniProt => "uniprot",
            QueryKind::Pdb => "pdb",
            QueryKind::Sequence => "sequence",
            QueryKind::Name => "name",
        }
    }
}

/// Return true if `q` matches the UniProt accession pattern
pub fn is_uniprot_id(q: &str) -> bool {
    UNIPROT_RE.is_match(q.trim())
}

/// Return true if `q` is a four-character PDB identifier
pub fn is_pdb_id(q: &str) -> bool {
    PDB_RE.is_match(q.trim())
}

/// Return true if `q` looks like a primary amino-acid sequence
///
/// Requires at least [`sequence::MIN_LENGTH`] residues, all drawn from the
/// twenty canonical one-letter codes.
pub fn is_amino_acid_sequence(q: &str) -> bool {
    let s = q.trim().to_uppercase();
    s.chars().count() >= sequence::MIN_LENGTH
        && s.chars().all(|c| sequence::VALID_RESIDUES.contains(c))
}

/// Classify a search term
///
/// Sequences are checked first, then PDB IDs, then UniProt accessions.
/// Anything else is treated as a protein name. Returns `None` for blank input.
pub fn classify(q: &str) -> Option<QueryKind> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }

    if is_amino_acid_sequence(q) {
        Some(QueryKind::Sequence)
    } else if is_pdb_id(q) {
        Some(QueryKind::Pdb)
    } else if is_uniprot_id(q) {
        Some(QueryKind::UniProt)
    } else {
        Some(QueryKind::Name)
    }
}

/// Map a structure identifier onto its source database
///
/// Returns the normalized (trimmed, uppercased) identifier, or `None` if the
/// identifier is neither a PDB ID nor a UniProt accession.
pub fn identify_structure(id: &str) -> Option<(StructureSource, String)> {
    let normalized = id.trim().to_uppercase();
    if is_pdb_id(&normalized) {
        Some((StructureSource::Pdb, normalized))
    } else if is_uniprot_id(&normalized) {
        Some((StructureSource::AlphaFold, normalized))
    } else {
        None
    }
}

/// Construct the AlphaFold DB model URL for `accession`
///
/// Version 4 models follow `<base>/files/AF-<ACC>-F1-model_v4.<ext>`.
pub fn build_afdb_model_url(base_url: &str, accession: &str, format: ModelFormat) -> String {
    format!(
        "{}/files/AF-{}-F1-model_v{}.{}",
        base_url.trim_end_matches('/'),
        accession.trim().to_uppercase(),
        upstream::ALPHAFOLD_MODEL_VERSION,
        format.extension()
    )
}

/// Construct the RCSB download URL for PDB entry `id`
pub fn build_pdb_url(base_url: &str, id: &str, format: ModelFormat) -> String {
    format!(
        "{}/download/{}.{}",
        base_url.trim_end_matches('/'),
        id.trim().to_uppercase(),
        format.extension()
    )
}
