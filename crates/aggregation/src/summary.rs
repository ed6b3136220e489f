//! Keyed summary views: net flow by (category, sector) and per-category totals.

use flow_core::{Amount, InvestorCategory};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Net flow by investor category and sector, in reporting units.
///
/// Iterates by category, then by sector label. Pairs without trades are
/// absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorNetSummary {
    entries: BTreeMap<(InvestorCategory, String), Amount>,
}

/// One entry of a `SectorNetSummary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorNetEntry<'a> {
    pub category: InvestorCategory,
    pub sector: &'a str,
    pub net: Amount,
}

impl SectorNetSummary {
    pub(crate) fn from_entries(entries: BTreeMap<(InvestorCategory, String), Amount>) -> Self {
        Self { entries }
    }

    /// Net flow for a pair, if it traded.
    pub fn get(&self, category: InvestorCategory, sector: &str) -> Option<Amount> {
        self.entries.get(&(category, sector.to_string())).copied()
    }

    /// All entries in (category, sector) order.
    pub fn iter(&self) -> impl Iterator<Item = SectorNetEntry<'_>> + '_ {
        self.entries.iter().map(|((category, sector), &net)| SectorNetEntry {
            category: *category,
            sector: sector.as_str(),
            net,
        })
    }

    /// Sectors and net flow of one category, by sector label.
    pub fn for_category(&self, category: InvestorCategory) -> impl Iterator<Item = (&str, Amount)> + '_ {
        self.entries
            .range((category, String::new())..)
            .take_while(move |((c, _), _)| *c == category)
            .map(|((_, sector), &net)| (sector.as_str(), net))
    }

    /// Number of sectors the category traded.
    pub fn sector_count(&self, category: InvestorCategory) -> usize {
        self.for_category(category).count()
    }

    /// Number of (category, sector) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SectorNetSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// A per-category total in reporting units.
///
/// Used for both net flow and traded volume. Holds one entry per category
/// present in the canonical table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals {
    totals: BTreeMap<InvestorCategory, Amount>,
}

/// Net flow by investor category.
pub type TotalNetByType = CategoryTotals;

/// Traded volume by investor category.
pub type VolumeTotalByType = CategoryTotals;

impl CategoryTotals {
    pub(crate) fn from_totals(totals: BTreeMap<InvestorCategory, Amount>) -> Self {
        Self { totals }
    }

    /// Total for a category, if present.
    pub fn get(&self, category: InvestorCategory) -> Option<Amount> {
        self.totals.get(&category).copied()
    }

    /// Totals in category order.
    pub fn iter(&self) -> impl Iterator<Item = (InvestorCategory, Amount)> + '_ {
        self.totals.iter().map(|(&c, &v)| (c, v))
    }

    /// Sum over all categories.
    pub fn grand_total(&self) -> Amount {
        self.totals.values().sum()
    }

    /// Each category's fraction of the grand total.
    ///
    /// Empty when the grand total is zero.
    pub fn shares(&self) -> BTreeMap<InvestorCategory, f64> {
        let total = self.grand_total();
        if total == 0.0 {
            return BTreeMap::new();
        }
        self.totals.iter().map(|(&c, &v)| (c, v / total)).collect()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
