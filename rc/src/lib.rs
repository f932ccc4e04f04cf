//! recordcheck - capacity record checks
//!
//! Four independent steps over a set of capacity records: deduplicate,
//! check completeness, check range, normalize timestamps.

pub mod cli;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod record;

pub use error::ValidationError;
pub use pipeline::{Pipeline, PipelineReport, dedup, normalize_timestamps, validate_complete, validate_non_negative};
pub use record::{Field, NormalizedRecord, Record};
