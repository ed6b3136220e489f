//! PyO3 bindings for the investor flow pipeline.
//!
//! Exposes the Rust pipeline to a Python presentation layer:
//! - Loading export records (JSON) into a snapshot
//! - The five flow views as plain Python containers
//! - Top/bottom sector ranking and the summary card

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use flow_aggregation::RankedSector;
use flow_core::{Config as RustConfig, Error as RustError, InvestorCategory};
use flow_ingestion::RawRecord;
use flow_pipeline::{FlowPipeline, FlowSnapshot, JsonRecordsSource};

// ============================================================================
// Conversions
// ============================================================================

fn to_py_err(err: RustError) -> PyErr {
    match err {
        RustError::InputAbsent(_) => PyRuntimeError::new_err(err.to_string()),
        RustError::Io(_) => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_category(label: &str) -> PyResult<InvestorCategory> {
    InvestorCategory::from_label(label).ok_or_else(|| {
        PyValueError::new_err(format!(
            "unknown investor category '{label}', expected LOCALS, FOREIGNERS or RETAIL"
        ))
    })
}

fn ranked_pairs(list: Vec<RankedSector>) -> Vec<(String, f64)> {
    list.into_iter().map(|r| (r.sector, r.net)).collect()
}

fn iso_dates(dates: &[chrono::NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
}

/// Dates, column labels and one row of values per date.
type PivotTable<C> = (Vec<String>, Vec<C>, Vec<Vec<f64>>);

// ============================================================================
// Python-exposed Pipeline
// ============================================================================

/// Investor flow pipeline.
#[pyclass]
pub struct PyFlowPipeline {
    inner: FlowPipeline,
}

impl PyFlowPipeline {
    fn current(&self) -> PyResult<Arc<FlowSnapshot>> {
        self.inner
            .snapshot()
            .ok_or_else(|| PyRuntimeError::new_err("no flow snapshot loaded"))
    }
}

#[pymethods]
impl PyFlowPipeline {
    /// Create a pipeline, optionally from a JSON configuration.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => RustConfig::from_json_str(json).map_err(to_py_err)?,
            None => RustConfig::default(),
        };
        Ok(PyFlowPipeline {
            inner: FlowPipeline::new(config).map_err(to_py_err)?,
        })
    }

    /// Load a JSON array of export records, e.g. `df.to_json(orient="records")`.
    ///
    /// `None` reports absent input.
    #[pyo3(signature = (records_json, source="python"))]
    fn load_json(&self, records_json: Option<&str>, source: &str) -> PyResult<()> {
        let records: Option<Vec<RawRecord>> = records_json
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| PyValueError::new_err(format!("invalid records JSON: {e}")))?;
        self.inner
            .load_records(source, records.as_deref())
            .map_err(to_py_err)?;
        Ok(())
    }

    /// Load a JSON-records export from disk.
    fn load_file(&self, path: &str) -> PyResult<()> {
        let source = JsonRecordsSource::new(path, self.inner.config().columns.clone());
        self.inner.reload(&source).map_err(to_py_err)?;
        Ok(())
    }

    /// Whether a snapshot is loaded.
    fn is_loaded(&self) -> bool {
        self.inner.snapshot().is_some()
    }

    /// Load time of the current snapshot (ISO-8601).
    fn loaded_at(&self) -> Option<String> {
        self.inner.snapshot().map(|s| s.loaded_at.to_rfc3339())
    }

    /// Net flow by (category, sector) as `(category, sector, net)` tuples.
    fn sector_summary(&self) -> PyResult<Vec<(String, String, f64)>> {
        let snapshot = self.current()?;
        Ok(snapshot
            .views
            .sector_summary
            .iter()
            .map(|e| (e.category.label().to_string(), e.sector.to_string(), e.net))
            .collect())
    }

    /// Net flow by category.
    fn total_net_by_type(&self) -> PyResult<HashMap<String, f64>> {
        let snapshot = self.current()?;
        Ok(snapshot
            .views
            .total_net_by_type
            .iter()
            .map(|(c, v)| (c.label().to_string(), v))
            .collect())
    }

    /// Traded volume by category.
    fn volume_total_by_type(&self) -> PyResult<HashMap<String, f64>> {
        let snapshot = self.current()?;
        Ok(snapshot
            .views
            .volume_total_by_type
            .iter()
            .map(|(c, v)| (c.label().to_string(), v))
            .collect())
    }

    /// Each category's share of traded volume.
    fn volume_shares(&self) -> PyResult<HashMap<String, f64>> {
        let snapshot = self.current()?;
        Ok(snapshot
            .views
            .volume_total_by_type
            .shares()
            .into_iter()
            .map(|(c, v)| (c.label().to_string(), v))
            .collect())
    }

    /// Daily net flow by category as `(dates, categories, rows)`.
    fn daily_evolution(&self) -> PyResult<PivotTable<String>> {
        let snapshot = self.current()?;
        let pivot = &snapshot.views.daily_evolution;
        Ok((
            iso_dates(pivot.dates()),
            pivot.columns().iter().map(|c| c.label().to_string()).collect(),
            pivot.rows().map(|(_, row)| row.to_vec()).collect(),
        ))
    }

    /// Daily net flow by (category, sector) as `(dates, columns, rows)`.
    fn sector_evolution(&self) -> PyResult<PivotTable<(String, String)>> {
        let snapshot = self.current()?;
        let pivot = &snapshot.views.sector_evolution;
        Ok((
            iso_dates(pivot.dates()),
            pivot
                .columns()
                .iter()
                .map(|k| (k.category.label().to_string(), k.sector.clone()))
                .collect(),
            pivot.rows().map(|(_, row)| row.to_vec()).collect(),
        ))
    }

    /// Distinct sector labels of the sector evolution.
    fn sectors(&self) -> PyResult<Vec<String>> {
        let snapshot = self.current()?;
        Ok(snapshot
            .views
            .sector_evolution
            .sectors()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Daily series of one sector per category as `(dates, [(category, series)])`.
    fn sector_series(&self, sector: &str) -> PyResult<(Vec<String>, Vec<(String, Vec<f64>)>)> {
        let snapshot = self.current()?;
        let pivot = &snapshot.views.sector_evolution;
        Ok((
            iso_dates(pivot.dates()),
            pivot
                .series_for_sector(sector)
                .into_iter()
                .map(|(c, series)| (c.label().to_string(), series))
                .collect(),
        ))
    }

    /// Top and bottom `n` sectors of a category as `(top, bottom)`.
    #[pyo3(signature = (category, n=3))]
    fn top_bottom(&self, category: &str, n: usize) -> PyResult<(Vec<(String, f64)>, Vec<(String, f64)>)> {
        let category = parse_category(category)?;
        let ranks = self.inner.top_bottom(category, n).map_err(to_py_err)?;
        Ok((ranked_pairs(ranks.top), ranked_pairs(ranks.bottom)))
    }

    /// Summary card as JSON.
    fn summary_json(&self) -> PyResult<String> {
        let summary = self.inner.summary().map_err(to_py_err)?;
        serde_json::to_string(&summary).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// The whole snapshot as JSON.
    fn snapshot_json(&self) -> PyResult<String> {
        let snapshot = self.current()?;
        serde_json::to_string(&*snapshot).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// Investor Flow Core - Rust flow pipeline for Python.
#[pymodule]
fn investor_flow_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFlowPipeline>()?;
    m.add("CATEGORIES", InvestorCategory::ALL.map(|c| c.label()).to_vec())?;

    Ok(())
}
