use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use portalscan_stage_flow::{detect_stage, PageSnapshot};

/// Classify a saved page snapshot, for debugging stage inference offline.
#[derive(Args)]
pub struct CheckArgs {
    /// Page snapshot (JSON)
    pub snapshot: PathBuf,
}

pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.snapshot)?;
    let snapshot: PageSnapshot = serde_json::from_str(&raw)?;
    println!("{}", detect_stage(&snapshot));
    Ok(())
}
