//! Collaborator services around the clustering core
//!
//! Everything with an outside dependency lives here: filesystem scanning,
//! exiftool invocation, CSV interchange, report output. The analysis core
//! consumes only the in-memory record table these produce.

pub mod csv_store;
pub mod file_scanner;
pub mod metadata_extractor;
pub mod report;

pub use csv_store::{load_records, save_records, CsvIssue};
pub use file_scanner::{ArtifactFile, FileScanner, ScanError, ScanResult};
pub use metadata_extractor::{ExtractError, MetadataExtractor};
pub use report::{render_summary, write_json};
