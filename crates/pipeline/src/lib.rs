//! Load orchestration for the investor flow pipeline.
//!
//! This crate provides:
//! - Trade sources (the loader seam)
//! - One-pass normalization and aggregation per load
//! - Immutable snapshots swapped in atomically
//! - Ranking and summary queries over the current snapshot

pub mod source;
pub mod snapshot;
pub mod pipeline;

pub use source::{InMemorySource, JsonRecordsSource, TradeSource};
pub use snapshot::FlowSnapshot;
pub use pipeline::FlowPipeline;
