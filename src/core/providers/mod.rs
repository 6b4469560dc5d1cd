//! Provider implementations

pub mod alphafold;
pub mod pdb;
pub mod uniprot;

pub use alphafold::AlphaFoldProvider;
pub use pdb::PdbProvider;
pub use uniprot::UniProtClient;
