//! Trade table normalization.
//!
//! Fills absent categorical values, folds sector aliases, maps raw account
//! codes onto investor categories and drops rows outside the three
//! recognized categories.

use flow_core::{
    config::NormalizationConfig, Amount, CanonicalTradeRow, Error, InvestorCategory, RawTradeRow,
    Result,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Statistics about a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationStats {
    /// Raw rows seen.
    pub rows_in: u64,
    /// Rows kept in the canonical table.
    pub rows_kept: u64,
    /// Rows dropped because their category is not recognized.
    pub rows_dropped: u64,
    /// Categorical fields filled with the sentinel.
    pub sentinel_fills: u64,
    /// Sector values folded by an alias.
    pub sector_remaps: u64,
    /// Account codes mapped by an alias.
    pub category_remaps: u64,
    /// Dropped rows by their raw account code.
    pub dropped_by_account: BTreeMap<String, u64>,
}

impl NormalizationStats {
    /// Fraction of input rows that were dropped.
    pub fn dropped_frac(&self) -> f64 {
        if self.rows_in > 0 {
            self.rows_dropped as f64 / self.rows_in as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Normalizer turning raw trade rows into the canonical trade table.
pub struct Normalizer {
    config: NormalizationConfig,
    /// Statistics of the most recent `normalize` call.
    stats: NormalizationStats,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(config: NormalizationConfig) -> Self {
        Self {
            config,
            stats: NormalizationStats::default(),
        }
    }

    /// Normalize a raw table.
    ///
    /// Fails with `SchemaMismatch` if any row lacks its trade date or an
    /// amount; in that case no rows are returned and the statistics of the
    /// previous call are kept.
    pub fn normalize(&mut self, raw: &[RawTradeRow]) -> Result<Vec<CanonicalTradeRow>> {
        let mut stats = NormalizationStats::default();
        let mut canonical = Vec::with_capacity(raw.len());

        for (row, trade) in raw.iter().enumerate() {
            stats.rows_in += 1;
            if let Some(kept) = self.normalize_row(row, trade, &mut stats)? {
                canonical.push(kept);
            }
        }

        stats.rows_kept = canonical.len() as u64;
        if stats.rows_dropped > 0 {
            debug!(
                dropped = stats.rows_dropped,
                by_account = ?stats.dropped_by_account,
                "dropped rows outside recognized investor categories"
            );
        }
        self.stats = stats;

        Ok(canonical)
    }

    fn normalize_row(
        &self,
        row: usize,
        trade: &RawTradeRow,
        stats: &mut NormalizationStats,
    ) -> Result<Option<CanonicalTradeRow>> {
        let trade_date = trade
            .trade_date
            .ok_or_else(|| Error::schema_mismatch("trade_date", row))?;
        let buy_amount = required_amount(trade.buy_amount, "buy_amount", row)?;
        let sell_amount = required_amount(trade.sell_amount, "sell_amount", row)?;
        let net_amount = required_amount(trade.net_amount, "net_amount", row)?;
        let total_amount = required_amount(trade.total_amount, "total_amount", row)?;

        let sector = self.fill(&trade.sector, stats);
        let sub_sector = self.fill(&trade.sub_sector, stats);
        let segment = self.fill(&trade.segment, stats);
        let account = self.fill(&trade.account, stats);

        let sector = match self.config.sector_aliases.get(&sector) {
            Some(alias) if *alias != sector => {
                stats.sector_remaps += 1;
                alias.clone()
            }
            _ => sector,
        };

        let category = match self.config.category_aliases.get(&account) {
            Some(&category) => {
                stats.category_remaps += 1;
                Some(category)
            }
            None => InvestorCategory::from_label(&account),
        };

        let Some(category) = category else {
            stats.rows_dropped += 1;
            *stats.dropped_by_account.entry(account).or_insert(0) += 1;
            return Ok(None);
        };

        Ok(Some(CanonicalTradeRow {
            trade_date,
            sector,
            sub_sector,
            segment,
            category,
            buy_amount,
            sell_amount,
            net_amount,
            total_amount,
        }))
    }

    fn fill(&self, value: &Option<String>, stats: &mut NormalizationStats) -> String {
        match value {
            Some(v) => v.clone(),
            None => {
                stats.sentinel_fills += 1;
                self.config.sentinel.clone()
            }
        }
    }

    /// Get normalization statistics.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizationConfig::default())
    }
}

fn required_amount(value: Option<Amount>, field: &str, row: usize) -> Result<Amount> {
    value.ok_or_else(|| Error::schema_mismatch(field, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flow_core::OTHERS;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn make_row(day: u32, sector: Option<&str>, account: Option<&str>, net: f64, total: f64) -> RawTradeRow {
        RawTradeRow {
            trade_date: Some(date(day)),
            sector: sector.map(str::to_string),
            sub_sector: Some("SUB".to_string()),
            segment: Some("NM".to_string()),
            account: account.map(str::to_string),
            buy_amount: Some((total + net) / 2.0),
            sell_amount: Some((total - net) / 2.0),
            net_amount: Some(net),
            total_amount: Some(total),
        }
    }

    #[test]
    fn test_category_remap() {
        let mut normalizer = Normalizer::default();
        let raw = vec![
            make_row(1, Some("BANK"), Some("GENIAL"), 2_000_000.0, 5_000_000.0),
            make_row(1, Some("FII"), Some("ESTRANGEIRO"), -1_000_000.0, 1_000_000.0),
            make_row(2, Some("BANK"), Some("LOCAL INSTITUCIONAL"), 500_000.0, 500_000.0),
        ];

        let canonical = normalizer.normalize(&raw).unwrap();

        assert_eq!(canonical.len(), 3);
        assert_eq!(canonical[0].category, InvestorCategory::Retail);
        assert_eq!(canonical[0].sector, "BANK");
        assert_eq!(canonical[1].category, InvestorCategory::Foreigners);
        assert_eq!(canonical[1].sector, OTHERS);
        assert_eq!(canonical[2].category, InvestorCategory::Locals);
        assert_eq!(canonical[2].trade_date, date(2));
    }

    #[test]
    fn test_sector_aliases_and_fill() {
        let mut normalizer = Normalizer::default();
        let mut missing = make_row(1, None, Some("GENIAL"), 1.0, 1.0);
        missing.segment = None;
        let raw = vec![
            make_row(1, Some("IBOV"), Some("GENIAL"), 1.0, 1.0),
            make_row(1, Some("ENERGY"), Some("GENIAL"), 1.0, 1.0),
            missing,
        ];

        let canonical = normalizer.normalize(&raw).unwrap();

        assert_eq!(canonical[0].sector, "Others");
        assert_eq!(canonical[1].sector, "ENERGY");
        assert_eq!(canonical[2].sector, "Others");
        assert_eq!(canonical[2].segment, "Others");

        let stats = normalizer.stats();
        assert_eq!(stats.sector_remaps, 1);
        assert_eq!(stats.sentinel_fills, 2);
    }

    #[test]
    fn test_unrecognized_categories_dropped() {
        let mut normalizer = Normalizer::default();
        let raw = vec![
            make_row(1, Some("BANK"), Some("UNKNOWN_DESK"), 9_000_000.0, 9_000_000.0),
            make_row(1, Some("BANK"), None, 1.0, 1.0),
            make_row(1, Some("BANK"), Some("genial"), 1.0, 1.0),
            make_row(1, Some("BANK"), Some("GENIAL"), 1.0, 1.0),
        ];

        let canonical = normalizer.normalize(&raw).unwrap();

        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical[0].category, InvestorCategory::Retail);

        let stats = normalizer.stats();
        assert_eq!(stats.rows_in, 4);
        assert_eq!(stats.rows_kept, 1);
        assert_eq!(stats.rows_dropped, 3);
        assert_eq!(stats.dropped_by_account.get("UNKNOWN_DESK"), Some(&1));
        assert_eq!(stats.dropped_by_account.get("Others"), Some(&1));
        assert!((stats.dropped_frac() - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_all_rows_dropped_is_empty_not_error() {
        let mut normalizer = Normalizer::default();
        let raw = vec![make_row(1, Some("BANK"), Some("TESOURARIA"), 1.0, 1.0)];

        let canonical = normalizer.normalize(&raw).unwrap();
        assert!(canonical.is_empty());
        assert!(normalizer.normalize(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_amount_is_schema_mismatch() {
        let mut normalizer = Normalizer::default();
        let good = make_row(1, Some("BANK"), Some("GENIAL"), 1.0, 1.0);
        normalizer.normalize(&[good.clone()]).unwrap();

        let mut bad = good.clone();
        bad.total_amount = None;

        let err = normalizer.normalize(&[good, bad]).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaMismatch { ref field, row: 1 } if field == "total_amount"
        ));
        // Previous pass statistics untouched.
        assert_eq!(normalizer.stats().rows_in, 1);
    }

    #[test]
    fn test_missing_date_is_schema_mismatch() {
        let mut normalizer = Normalizer::default();
        let mut row = make_row(1, Some("BANK"), Some("UNKNOWN_DESK"), 1.0, 1.0);
        row.trade_date = None;

        let err = normalizer.normalize(&[row]).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { ref field, row: 0 } if field == "trade_date"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut normalizer = Normalizer::default();
        let raw = vec![
            make_row(1, Some("BANK"), Some("GENIAL"), 2.0, 5.0),
            make_row(1, Some("FII"), Some("ESTRANGEIRO"), -1.0, 1.0),
            make_row(2, None, Some("LOCAL INSTITUCIONAL"), 0.5, 0.5),
            make_row(2, Some("BANK"), Some("UNKNOWN_DESK"), 7.0, 7.0),
            make_row(3, Some("RETAIL_CO"), Some("RETAIL"), 1.0, 1.0),
        ];

        let first = normalizer.normalize(&raw).unwrap();
        let again: Vec<RawTradeRow> = first.iter().map(RawTradeRow::from).collect();
        let second = normalizer.normalize(&again).unwrap();

        assert_eq!(first, second);
        assert_eq!(normalizer.stats().rows_dropped, 0);
        assert_eq!(normalizer.stats().sector_remaps, 0);
        assert_eq!(normalizer.stats().sentinel_fills, 0);
    }

    #[test]
    fn test_amounts_unchanged() {
        let mut normalizer = Normalizer::default();
        let raw = vec![make_row(1, Some("BANK"), Some("GENIAL"), -1234.5, 9876.5)];

        let canonical = normalizer.normalize(&raw).unwrap();
        approx::assert_relative_eq!(canonical[0].net_amount, -1234.5);
        approx::assert_relative_eq!(canonical[0].total_amount, 9876.5);
        approx::assert_relative_eq!(canonical[0].buy_amount, 4321.0);
    }
}
