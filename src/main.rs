// =============================================================================
// ta-engine — command-line harness
// =============================================================================
//
//   ta-engine [INPUT.json]
//
// Reads an `AnalysisRequest` object, or a bare array of provider rows
// `[timestamp_ms, open, high, low, close, volume?]`, from INPUT.json or stdin
// and prints the analysis report as pretty JSON on stdout.  Logs go to stderr.
//
// Configuration: `TA_ENGINE_CONFIG` names an `EngineConfig` JSON file; without
// it the defaults apply.  A `.env` file is honoured.
// =============================================================================

use std::io::Read;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ta_engine::precision::format_price;
use ta_engine::{analyze, analyze_series, AnalysisReport, AnalysisRequest, EngineConfig, PriceSeries};

const CONFIG_ENV: &str = "TA_ENGINE_CONFIG";

fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── 2. Config ────────────────────────────────────────────────────────
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => EngineConfig::load(&path).unwrap_or_else(|e| {
            warn!(error = %e, path = %path, "Failed to load engine config, using defaults");
            EngineConfig::default()
        }),
        Err(_) => EngineConfig::default(),
    };

    // ── 3. Input ─────────────────────────────────────────────────────────
    let (source, raw) = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read input from {path}"))?;
            (path, raw)
        }
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read input from stdin")?;
            ("<stdin>".to_string(), raw)
        }
    };

    let input: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("input from {source} is not valid JSON"))?;

    // ── 4. Analysis ──────────────────────────────────────────────────────
    let report = run(input, &config).with_context(|| format!("failed to analyze {source}"))?;

    info!(
        source = %source,
        data_points = report.summary.data_points,
        price = %format_price(report.summary.current_price),
        recommendation = %report.signals.recommendation,
        "analysis finished"
    );

    let report = if config.round_output {
        report.rounded()
    } else {
        report
    };

    let out = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
    println!("{out}");
    Ok(())
}

fn run(input: serde_json::Value, config: &EngineConfig) -> Result<AnalysisReport> {
    match input {
        serde_json::Value::Array(rows) => {
            let series = PriceSeries::from_rows(&rows)?;
            Ok(analyze_series(&series, None, None, config))
        }
        other => {
            let request: AnalysisRequest =
                serde_json::from_value(other).context("input is not an analysis request")?;
            Ok(analyze(&request, config)?)
        }
    }
}
