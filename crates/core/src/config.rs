//! Configuration structures for the investor flow pipeline.

use crate::error::{Error, Result};
use crate::types::{InvestorCategory, OTHERS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Export column names.
    pub columns: ColumnMapping,
    /// Normalization rules.
    pub normalization: NormalizationConfig,
    /// Aggregation configuration.
    pub aggregation: AggregationConfig,
    /// Ranking / summary configuration.
    pub rank: RankConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing sections use defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        let divisor = self.aggregation.unit_divisor;
        if !divisor.is_finite() || divisor == 0.0 {
            return Err(Error::config(format!("unit_divisor must be finite and non-zero, got {divisor}")));
        }
        if self.rank.default_n == 0 {
            return Err(Error::config("rank.default_n must be positive"));
        }
        if self.normalization.sentinel.is_empty() {
            return Err(Error::config("normalization.sentinel must not be empty"));
        }
        Ok(())
    }
}

/// Column names of the tabular export, one per canonical field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub trade_date: String,
    pub sector: String,
    pub sub_sector: String,
    pub segment: String,
    pub account: String,
    pub buy_amount: String,
    pub sell_amount: String,
    pub net_amount: String,
    pub total_amount: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            trade_date: "DT_NEGOCIO".to_string(),
            sector: "CD_SETOR".to_string(),
            sub_sector: "CD_SUBSETOR".to_string(),
            segment: "CD_SEGMENTO".to_string(),
            account: "CONTA".to_string(),
            buy_amount: "VL_COMPRA".to_string(),
            sell_amount: "VL_VENDA".to_string(),
            net_amount: "VL_NET".to_string(),
            total_amount: "VL_TOTAL".to_string(),
        }
    }
}

/// Normalization rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Value used for absent categorical fields.
    pub sentinel: String,
    /// Sector values folded into another label.
    pub sector_aliases: BTreeMap<String, String>,
    /// Raw account codes mapped onto investor categories.
    pub category_aliases: BTreeMap<String, InvestorCategory>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        let sector_aliases = [("FII", OTHERS), ("IBOV", OTHERS)]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        let category_aliases = [
            ("ESTRANGEIRO", InvestorCategory::Foreigners),
            ("LOCAL INSTITUCIONAL", InvestorCategory::Locals),
            ("GENIAL", InvestorCategory::Retail),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to))
        .collect();

        Self {
            sentinel: OTHERS.to_string(),
            sector_aliases,
            category_aliases,
        }
    }
}

/// Aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Divisor applied to every monetary sum (1e6 reports millions).
    pub unit_divisor: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            unit_divisor: 1_000_000.0,
        }
    }
}

/// Ranking and summary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Number of sectors in top/bottom lists.
    pub default_n: usize,
    /// Categories shown with most bought / most sold sectors in the summary.
    pub summary_categories: Vec<InvestorCategory>,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            default_n: 3,
            summary_categories: vec![InvestorCategory::Locals, InvestorCategory::Foreigners],
        }
    }
}
