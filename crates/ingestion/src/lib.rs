//! Data ingestion and normalization for the investor flow pipeline.
//!
//! This crate handles:
//! - Relabeling export columns onto raw trade rows
//! - Sentinel fill of absent categorical values
//! - Sector and investor category remapping
//! - Filtering to the recognized investor categories

pub mod records;
pub mod normalizer;

pub use records::{RawRecord, RecordMapper};
pub use normalizer::{NormalizationStats, Normalizer};
