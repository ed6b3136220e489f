//! Load orchestration.
//!
//! Runs normalization and aggregation over one full raw table and installs
//! the result as the current snapshot. Readers clone the `Arc` of the
//! snapshot they want; a load replaces the pointer and never mutates a
//! published snapshot.

use crate::snapshot::FlowSnapshot;
use crate::source::TradeSource;
use chrono::Utc;
use flow_aggregation::{Aggregator, FlowSummary, TopBottom};
use flow_core::{Config, Error, InvestorCategory, RawTradeRow, Result};
use flow_ingestion::{Normalizer, RawRecord, RecordMapper};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// The flow pipeline.
pub struct FlowPipeline {
    config: Config,
    /// Current snapshot, `None` until the first successful load.
    current: RwLock<Option<Arc<FlowSnapshot>>>,
}

impl FlowPipeline {
    /// Create a pipeline. Fails if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            current: RwLock::new(None),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load a raw table. `None` means the loader supplied no data.
    ///
    /// On failure the previous snapshot stays installed.
    pub fn load(&self, source: &str, rows: Option<&[RawTradeRow]>) -> Result<Arc<FlowSnapshot>> {
        let result = rows
            .ok_or_else(|| Error::input_absent(format!("no trade data supplied by {source}")))
            .and_then(|rows| self.build_snapshot(source, rows));
        self.install(source, result)
    }

    /// Load column-keyed export records.
    pub fn load_records(&self, source: &str, records: Option<&[RawRecord]>) -> Result<Arc<FlowSnapshot>> {
        let mapper = RecordMapper::new(self.config.columns.clone());
        let result = match records {
            Some(records) => mapper
                .map_records(records)
                .and_then(|rows| self.build_snapshot(source, &rows)),
            None => Err(Error::input_absent(format!("no trade data supplied by {source}"))),
        };
        self.install(source, result)
    }

    /// Fetch from a source and load.
    pub fn reload(&self, source: &dyn TradeSource) -> Result<Arc<FlowSnapshot>> {
        let name = source.describe();
        let result = source.fetch().and_then(|rows| {
            let rows = rows.ok_or_else(|| Error::input_absent(format!("no trade data found at {name}")))?;
            self.build_snapshot(&name, &rows)
        });
        self.install(&name, result)
    }

    fn build_snapshot(&self, source: &str, rows: &[RawTradeRow]) -> Result<FlowSnapshot> {
        let mut normalizer = Normalizer::new(self.config.normalization.clone());
        let canonical = normalizer.normalize(rows)?;
        let views = Aggregator::new(&self.config.aggregation).aggregate(&canonical);

        Ok(FlowSnapshot {
            loaded_at: Utc::now(),
            source: source.to_string(),
            stats: normalizer.stats().clone(),
            views,
        })
    }

    fn install(&self, source: &str, result: Result<FlowSnapshot>) -> Result<Arc<FlowSnapshot>> {
        match result {
            Ok(snapshot) => {
                info!(
                    source,
                    rows_in = snapshot.stats.rows_in,
                    rows_kept = snapshot.stats.rows_kept,
                    sectors = snapshot.views.sector_summary.len(),
                    dates = snapshot.views.daily_evolution.dates().len(),
                    "loaded flow snapshot"
                );
                let snapshot = Arc::new(snapshot);
                let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
                *current = Some(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(err) => {
                warn!(source, error = %err, "flow load failed; previous snapshot kept");
                Err(err)
            }
        }
    }

    /// Current snapshot, if any load has succeeded.
    pub fn snapshot(&self) -> Option<Arc<FlowSnapshot>> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn require_snapshot(&self) -> Result<Arc<FlowSnapshot>> {
        self.snapshot()
            .ok_or_else(|| Error::input_absent("no flow snapshot loaded"))
    }

    /// Top and bottom `n` sectors of a category in the current snapshot.
    pub fn top_bottom(&self, category: InvestorCategory, n: usize) -> Result<TopBottom> {
        self.require_snapshot()?.top_bottom(category, n)
    }

    /// Summary card of the current snapshot.
    pub fn summary(&self) -> Result<FlowSummary> {
        self.require_snapshot()?.summary(&self.config.rank)
    }
}
