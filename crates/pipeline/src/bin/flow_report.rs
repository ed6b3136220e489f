//! flow-report: run the flow pipeline over a JSON-records export and print
//! the resulting views as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use flow_core::{Config, InvestorCategory};
use flow_pipeline::{FlowPipeline, JsonRecordsSource};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flow-report", about = "Investor flow views from a trade export")]
struct Cli {
    /// JSON array of export records (e.g. pandas `to_json(orient="records")`).
    input: PathBuf,

    /// JSON configuration overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of sectors in top/bottom lists. Defaults to the configured value.
    #[arg(long)]
    top: Option<usize>,

    /// Pretty-print the output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(n) = cli.top {
        config.rank.default_n = n;
    }

    let pipeline = FlowPipeline::new(config).context("invalid configuration")?;
    let source = JsonRecordsSource::new(&cli.input, pipeline.config().columns.clone());
    let snapshot = pipeline
        .reload(&source)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    let n = pipeline.config().rank.default_n;
    let mut rankings = Map::new();
    for category in InvestorCategory::ALL {
        let ranks = snapshot.top_bottom(category, n)?;
        rankings.insert(category.label().to_string(), serde_json::to_value(ranks)?);
    }

    let mut report = Map::new();
    report.insert("snapshot".to_string(), serde_json::to_value(&*snapshot)?);
    report.insert(
        "volume_shares".to_string(),
        serde_json::to_value(snapshot.views.volume_total_by_type.shares())?,
    );
    report.insert("summary".to_string(), serde_json::to_value(pipeline.summary()?)?);
    report.insert("rankings".to_string(), Value::Object(rankings));
    let report = Value::Object(report);

    let out = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");

    Ok(())
}
