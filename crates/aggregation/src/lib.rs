//! Flow view computation for the investor flow pipeline.
//!
//! This crate handles:
//! - Net flow by (investor category, sector)
//! - Net flow and traded volume by investor category
//! - Dense daily pivots by category and by (category, sector)
//! - Top/bottom sector ranking and the summary card

pub mod summary;
pub mod pivot;
pub mod engine;
pub mod rank;

pub use summary::{CategoryTotals, SectorNetEntry, SectorNetSummary, TotalNetByType, VolumeTotalByType};
pub use pivot::{DailyEvolution, DensePivot, SectorEvolution, SectorKey};
pub use engine::{Aggregator, FlowViews};
pub use rank::{rank_sectors, top_bottom, FlowSummary, RankedSector, TopBottom};
