//! Aggregation engine.
//!
//! Derives the five flow views from one canonical trade table. Each view is
//! summed directly from the canonical rows; none is derived from another.

use crate::{
    pivot::{DailyEvolution, DensePivot, SectorEvolution, SectorKey},
    summary::{CategoryTotals, SectorNetSummary, TotalNetByType, VolumeTotalByType},
};
use flow_core::{config::AggregationConfig, Amount, CanonicalTradeRow, InvestorCategory, TradeDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The complete set of views derived from one canonical table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowViews {
    pub sector_summary: SectorNetSummary,
    pub total_net_by_type: TotalNetByType,
    pub volume_total_by_type: VolumeTotalByType,
    pub daily_evolution: DailyEvolution,
    pub sector_evolution: SectorEvolution,
}

impl FlowViews {
    /// True when the canonical table had no rows.
    pub fn is_empty(&self) -> bool {
        self.sector_summary.is_empty()
    }
}

/// Aggregator producing `FlowViews`.
#[derive(Debug, Clone)]
pub struct Aggregator {
    /// Divisor applied to every raw sum.
    unit_divisor: f64,
}

impl Aggregator {
    /// Create a new aggregator from configuration.
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            unit_divisor: config.unit_divisor,
        }
    }

    /// Compute all five views.
    pub fn aggregate(&self, rows: &[CanonicalTradeRow]) -> FlowViews {
        let views = FlowViews {
            sector_summary: self.sector_net_summary(rows),
            total_net_by_type: self.total_net_by_type(rows),
            volume_total_by_type: self.volume_total_by_type(rows),
            daily_evolution: self.daily_evolution(rows),
            sector_evolution: self.sector_evolution(rows),
        };

        debug!(
            rows = rows.len(),
            summary_entries = views.sector_summary.len(),
            dates = views.daily_evolution.dates().len(),
            sector_columns = views.sector_evolution.columns().len(),
            "aggregated flow views"
        );

        views
    }

    /// Net flow grouped by (category, sector).
    pub fn sector_net_summary(&self, rows: &[CanonicalTradeRow]) -> SectorNetSummary {
        let mut sums: BTreeMap<(InvestorCategory, String), Amount> = BTreeMap::new();
        for row in rows {
            *sums.entry((row.category, row.sector.clone())).or_insert(0.0) += row.net_amount;
        }
        for net in sums.values_mut() {
            *net /= self.unit_divisor;
        }
        SectorNetSummary::from_entries(sums)
    }

    /// Net flow grouped by category.
    pub fn total_net_by_type(&self, rows: &[CanonicalTradeRow]) -> TotalNetByType {
        self.category_totals(rows, |row| row.net_amount)
    }

    /// Traded volume grouped by category.
    pub fn volume_total_by_type(&self, rows: &[CanonicalTradeRow]) -> VolumeTotalByType {
        self.category_totals(rows, |row| row.total_amount)
    }

    fn category_totals(
        &self,
        rows: &[CanonicalTradeRow],
        amount: impl Fn(&CanonicalTradeRow) -> Amount,
    ) -> CategoryTotals {
        let mut sums: BTreeMap<InvestorCategory, Amount> = BTreeMap::new();
        for row in rows {
            *sums.entry(row.category).or_insert(0.0) += amount(row);
        }
        for total in sums.values_mut() {
            *total /= self.unit_divisor;
        }
        CategoryTotals::from_totals(sums)
    }

    /// Dense (date x category) pivot of net flow.
    pub fn daily_evolution(&self, rows: &[CanonicalTradeRow]) -> DailyEvolution {
        let mut sums: BTreeMap<(TradeDate, InvestorCategory), Amount> = BTreeMap::new();
        for row in rows {
            *sums.entry((row.trade_date, row.category)).or_insert(0.0) += row.net_amount;
        }
        DensePivot::from_sums(&sums, self.unit_divisor)
    }

    /// Dense (date x (category, sector)) pivot of net flow.
    pub fn sector_evolution(&self, rows: &[CanonicalTradeRow]) -> SectorEvolution {
        let mut sums: BTreeMap<(TradeDate, SectorKey), Amount> = BTreeMap::new();
        for row in rows {
            let key = SectorKey::new(row.category, row.sector.as_str());
            *sums.entry((row.trade_date, key)).or_insert(0.0) += row.net_amount;
        }
        DensePivot::from_sums(&sums, self.unit_divisor)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(&AggregationConfig::default())
    }
}
