use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use portalscan_result_store::{JsonResultStore, ResultStore};

use crate::config::ScanConfig;

#[derive(Args)]
pub struct ResultsArgs {
    /// Emit the full map as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_results(config: &ScanConfig, args: ResultsArgs) -> Result<()> {
    let store = JsonResultStore::new(config.results_path());
    let all = store.get_all()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    if all.is_empty() {
        println!("no captured results");
        return Ok(());
    }
    for (identifier, captured) in &all {
        let when = DateTime::<Utc>::from_timestamp_millis(captured.captured_at_ms)
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| format!("@{}ms", captured.captured_at_ms));
        println!(
            "{identifier}: {} records, captured {when}",
            captured.records.len()
        );
    }
    Ok(())
}
