//! Flow log tagging: classify each record by dstport/protocol against a
//! lookup table and count tags and port/protocol combinations.

pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod models;
pub mod parser;
pub mod protocol;
pub mod report;
pub mod stats;
pub mod tagger;

pub use engine::{run, ScanOptions, ScanOutcome};
pub use error::{FlowTagError, Result};
pub use lookup::LookupTable;
pub use stats::Aggregator;
