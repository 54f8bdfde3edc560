//! Sample Source
//!
//! Loads pre-scored feature tables and replays them as a bounded,
//! optionally paced sequence of samples.

mod error;
mod stream;
mod table;

pub use error::SourceError;
pub use stream::{SampleSource, SampleStream, Samples};
pub use table::{FeatureTable, Sample, DEFAULT_LABEL_COLUMN};
