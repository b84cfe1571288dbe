//! Clinical-trial registry records for trialaudit
//!
//! - [`RegistryRecord`]: the structured record the comparison engine consumes
//! - [`from_ctgov_v2`]: conversion from raw ClinicalTrials.gov API v2 study JSON
//! - [`load_directory`]: loading a directory of structured or raw record files
//!
//! Network retrieval is not part of this crate; records arrive as files or values.

use std::path::PathBuf;

pub mod ctgov;
pub mod dates;
pub mod loader;
pub mod model;

pub use ctgov::{from_ctgov_v2, is_raw_study};
pub use dates::{parse_partial_date, starts_after, PartialDate};
pub use loader::{load_directory, load_record, parse_record};
pub use model::*;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid registry JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("registry record in {} has no trial identifier", path.display())]
    MissingIdentifier { path: PathBuf },
    #[error("no registry records found in {}", dir.display())]
    NoRecords { dir: PathBuf },
}
