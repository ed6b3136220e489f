//! Core data types for the investor flow pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade date (the temporal key of every view).
pub type TradeDate = NaiveDate;

/// Monetary amount in base currency units.
pub type Amount = f64;

/// Label used for absent or folded categorical values.
pub const OTHERS: &str = "Others";

/// Canonical investor category.
///
/// Variant order is the column order of the daily evolution matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvestorCategory {
    /// Local institutional investors.
    Locals,
    /// Foreign investors.
    Foreigners,
    /// Retail (the broker's own clients).
    Retail,
}

impl InvestorCategory {
    /// All categories in canonical order.
    pub const ALL: [InvestorCategory; 3] = [
        InvestorCategory::Locals,
        InvestorCategory::Foreigners,
        InvestorCategory::Retail,
    ];

    /// Upper-case display label.
    pub fn label(self) -> &'static str {
        match self {
            InvestorCategory::Locals => "LOCALS",
            InvestorCategory::Foreigners => "FOREIGNERS",
            InvestorCategory::Retail => "RETAIL",
        }
    }

    /// Parse an exact canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for InvestorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One trade row as handed over by the external loader.
///
/// Every field may be absent. Categorical absences are filled during
/// normalization; numeric and date absences are rejected there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTradeRow {
    /// Trade date.
    pub trade_date: Option<TradeDate>,
    /// Sector code.
    pub sector: Option<String>,
    /// Sub-sector code.
    pub sub_sector: Option<String>,
    /// Segment code.
    pub segment: Option<String>,
    /// Account / investor category code, before remapping.
    pub account: Option<String>,
    /// Buy amount.
    pub buy_amount: Option<Amount>,
    /// Sell amount.
    pub sell_amount: Option<Amount>,
    /// Net amount (buy - sell).
    pub net_amount: Option<Amount>,
    /// Total traded amount.
    pub total_amount: Option<Amount>,
}

/// A trade row after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTradeRow {
    pub trade_date: TradeDate,
    pub sector: String,
    pub sub_sector: String,
    pub segment: String,
    pub category: InvestorCategory,
    pub buy_amount: Amount,
    pub sell_amount: Amount,
    pub net_amount: Amount,
    pub total_amount: Amount,
}

impl From<&CanonicalTradeRow> for RawTradeRow {
    fn from(row: &CanonicalTradeRow) -> Self {
        RawTradeRow {
            trade_date: Some(row.trade_date),
            sector: Some(row.sector.clone()),
            sub_sector: Some(row.sub_sector.clone()),
            segment: Some(row.segment.clone()),
            account: Some(row.category.label().to_string()),
            buy_amount: Some(row.buy_amount),
            sell_amount: Some(row.sell_amount),
            net_amount: Some(row.net_amount),
            total_amount: Some(row.total_amount),
        }
    }
}
