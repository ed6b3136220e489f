//! Dense date-indexed pivots.
//!
//! A pivot has one row per observed trade date and one column per observed
//! column key. Every (date, column) cell is materialized; combinations that
//! did not trade hold zero.

use flow_core::{Amount, InvestorCategory, TradeDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Column key of the sector evolution pivot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SectorKey {
    pub category: InvestorCategory,
    pub sector: String,
}

impl SectorKey {
    pub fn new(category: InvestorCategory, sector: impl Into<String>) -> Self {
        Self {
            category,
            sector: sector.into(),
        }
    }
}

/// Dense matrix of amounts indexed by (trade date, column key).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensePivot<K> {
    /// Row index, ascending.
    dates: Vec<TradeDate>,
    /// Column index, ascending.
    columns: Vec<K>,
    /// One row of `columns.len()` values per date.
    values: Vec<Vec<Amount>>,
}

/// Daily net flow by investor category.
pub type DailyEvolution = DensePivot<InvestorCategory>;

/// Daily net flow by (investor category, sector).
pub type SectorEvolution = DensePivot<SectorKey>;

impl<K: Ord + Clone> DensePivot<K> {
    /// Build from raw-unit sums.
    ///
    /// The key universe is the cross product of observed dates and observed
    /// columns; every cell is filled (zero if untraded) before dividing by
    /// `divisor`.
    pub fn from_sums(sums: &BTreeMap<(TradeDate, K), Amount>, divisor: f64) -> Self {
        let dates: Vec<TradeDate> = sums
            .keys()
            .map(|(d, _)| *d)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns: Vec<K> = sums
            .keys()
            .map(|(_, k)| k.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Full cross product, zero until a sum lands in the cell.
        let mut values = vec![vec![0.0; columns.len()]; dates.len()];
        for ((date, key), &raw) in sums {
            if let (Ok(i), Ok(j)) = (dates.binary_search(date), columns.binary_search(key)) {
                values[i][j] = raw;
            }
        }

        for cell in values.iter_mut().flatten() {
            *cell /= divisor;
        }

        Self {
            dates,
            columns,
            values,
        }
    }

    /// Row index.
    pub fn dates(&self) -> &[TradeDate] {
        &self.dates
    }

    /// Column index.
    pub fn columns(&self) -> &[K] {
        &self.columns
    }

    /// Cell value, `None` only if the date or column is outside the universe.
    pub fn get(&self, date: TradeDate, key: &K) -> Option<Amount> {
        let i = self.dates.binary_search(&date).ok()?;
        let j = self.columns.binary_search(key).ok()?;
        Some(self.values[i][j])
    }

    /// All values for one date, in column order.
    pub fn row(&self, date: TradeDate) -> Option<&[Amount]> {
        let i = self.dates.binary_search(&date).ok()?;
        Some(&self.values[i])
    }

    /// The series of one column, in date order.
    pub fn column(&self, key: &K) -> Option<Vec<Amount>> {
        let j = self.columns.binary_search(key).ok()?;
        Some(self.values.iter().map(|row| row[j]).collect())
    }

    /// Iterate (date, row) pairs.
    pub fn rows(&self) -> impl Iterator<Item = (TradeDate, &[Amount])> + '_ {
        self.dates.iter().copied().zip(self.values.iter().map(Vec::as_slice))
    }

    /// Number of cells (dates x columns).
    pub fn cell_count(&self) -> usize {
        self.dates.len() * self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl<K> Default for DensePivot<K> {
    fn default() -> Self {
        Self {
            dates: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl DensePivot<SectorKey> {
    /// Distinct sector labels, sorted.
    pub fn sectors(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|k| k.sector.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Daily series of one sector for every category that traded it.
    pub fn series_for_sector(&self, sector: &str) -> Vec<(InvestorCategory, Vec<Amount>)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, k)| k.sector == sector)
            .map(|(j, k)| (k.category, self.values.iter().map(|row| row[j]).collect()))
            .collect()
    }
}
