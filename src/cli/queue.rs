use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use portalscan_queue_builder::{build_queue, JsonRowDataCache, QueueBuildError};

/// Dry-run the queue builder against saved schedule markup; no session is
/// created.
#[derive(Args)]
pub struct QueueArgs {
    /// Saved schedule-page HTML
    pub page: PathBuf,

    /// Row-data cache exported by the host-side scan (JSON)
    #[arg(long, value_name = "FILE")]
    pub cache: PathBuf,

    /// Emit the queue as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_queue(args: QueueArgs) -> Result<()> {
    let html = fs::read_to_string(&args.page)?;
    let cache = JsonRowDataCache::load(&args.cache)?;

    match build_queue(&html, &cache) {
        Ok(queue) if args.json => println!("{}", serde_json::to_string_pretty(&queue)?),
        Ok(queue) => {
            for (position, item) in queue.iter().enumerate() {
                let name = item.name.as_deref().unwrap_or("-");
                println!("{:>3}. {}  {}", position + 1, item.identifier, name);
            }
        }
        Err(QueueBuildError::NoEligibleRows) => println!("no eligible items"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
