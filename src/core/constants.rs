//! Constants for upstream endpoints, query validation and response fields
//!
//! This module defines the default upstream base URLs, the residue alphabet
//! used for sequence detection, and the user-facing error messages shared by
//! the HTTP handlers and their tests.

/// Default upstream base URLs
pub mod upstream {
    /// AlphaFold DB REST API (prediction metadata)
    pub const ALPHAFOLD_API: &str = "https://alphafold.ebi.ac.uk";

    /// AlphaFold DB model files
    pub const ALPHAFOLD_FILES: &str = "https://alphafold.ebi.ac.uk";

    /// UniProt REST API
    pub const UNIPROT_API: &str = "https://rest.uniprot.org";

    /// RCSB PDB data API
    pub const RCSB_DATA: &str = "https://data.rcsb.org";

    /// RCSB PDB file download service
    pub const RCSB_FILES: &str = "https://files.rcsb.org";

    /// AlphaFold DB model version served by the files endpoint
    pub const ALPHAFOLD_MODEL_VERSION: u32 = 4;

    /// Hosts the structure proxy may fetch from by default
    pub const DEFAULT_PROXY_HOSTS: [&str; 2] = ["alphafold.ebi.ac.uk", "files.rcsb.org"];
}

/// Query validation constants
pub mod sequence {
    /// The twenty canonical amino-acid one-letter codes.
    /// Ambiguity codes (B, Z, X) are not accepted.
    pub const VALID_RESIDUES: &str = "ACDEFGHIKLMNPQRSTVWY";

    /// Minimum residue count for a query to be treated as a sequence
    pub const MIN_LENGTH: usize = 10;
}

/// Structure source identifiers as they appear in JSON
pub mod source {
    /// AlphaFold DB predicted model
    pub const ALPHAFOLD: &str = "alphafold";

    /// Experimentally determined PDB entry
    pub const PDB: &str = "pdb";
}

/// Method label used for predicted models
pub const PREDICTED_METHOD: &str = "Predicted (AlphaFold)";

/// Error messages returned to clients
pub mod message {
    pub const MISSING_QUERY: &str = "Missing 'query'";
    pub const SEQUENCE_UNSUPPORTED: &str = "Searching by amino acid sequence is not yet supported.";
    pub const UNRESOLVED_NAME: &str = "Could not resolve to a UniProt accession";
    pub const MISSING_ID: &str = "Missing 'id'";
    pub const MISSING_URL: &str = "Missing url";
    pub const INVALID_URL: &str = "Invalid url";
    pub const UNSUPPORTED_SCHEME: &str = "Unsupported scheme";
    pub const HOST_NOT_ALLOWED: &str = "Host not allowed";
}
