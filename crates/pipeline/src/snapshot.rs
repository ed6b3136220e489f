//! Immutable result of one load.

use chrono::{DateTime, Utc};
use flow_aggregation::{top_bottom, FlowSummary, FlowViews, TopBottom};
use flow_core::{config::RankConfig, InvestorCategory, Result};
use flow_ingestion::NormalizationStats;
use serde::Serialize;

/// Views of one load, together with where they came from.
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    /// When the snapshot was built.
    pub loaded_at: DateTime<Utc>,
    /// Description of the trade source.
    pub source: String,
    /// Normalization statistics of the load.
    pub stats: NormalizationStats,
    /// The five derived views.
    pub views: FlowViews,
}

impl FlowSnapshot {
    /// Top and bottom `n` sectors of a category.
    pub fn top_bottom(&self, category: InvestorCategory, n: usize) -> Result<TopBottom> {
        top_bottom(&self.views.sector_summary, category, n)
    }

    /// The summary card.
    pub fn summary(&self, config: &RankConfig) -> Result<FlowSummary> {
        FlowSummary::build(&self.views, config)
    }
}
