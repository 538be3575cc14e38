//! metasift — forensic artifact metadata clustering
//!
//! Takes files collected from multiple sources (a phone dump, a laptop
//! image), flattens their metadata into one record table, and clusters the
//! artifacts two complementary ways:
//!
//! - **Similarity Groups**: artifacts sharing an exact field+value within
//!   the same source, transitively closed.
//! - **Unique Associations**: artifacts whose otherwise-unique metadata
//!   overlaps on some non-trivial value, field identity ignored,
//!   transitively closed.
//!
//! The clustering core (`analysis`) is pure and synchronous; scanning,
//! exiftool invocation, CSV interchange and reporting live in `services`.

pub mod analysis;
pub mod config;
pub mod error;
pub mod records;
pub mod services;

pub use analysis::{analyze, AnalysisReport};
pub use config::CaseConfig;
pub use error::{Error, Result};
pub use records::{MetadataRecord, RawRecord, RecordStore};
