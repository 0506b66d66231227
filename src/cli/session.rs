use anyhow::Result;
use clap::{Args, Subcommand};

use portalscan_scan_state::{JsonSessionStore, SessionStore};

use crate::config::ScanConfig;

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub action: SessionAction,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print the persisted session record
    Show {
        /// Emit the raw record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the persisted session record
    Clear,
}

pub fn cmd_session(config: &ScanConfig, args: SessionArgs) -> Result<()> {
    let store = JsonSessionStore::new(config.session_path());
    match args.action {
        SessionAction::Show { json } => match store.load()? {
            None => println!("no session record"),
            Some(session) if json => println!("{}", serde_json::to_string_pretty(&session)?),
            Some(session) => {
                println!("scan id:   {}", session.scan_id);
                println!("active:    {}", session.active);
                println!("auth wait: {}", session.auth_wait);
                println!("progress:  {}/{}", session.index, session.queue.len());
                if let Some(current) = &session.current_item {
                    println!("current:   {current}");
                }
                println!("status:    {}", session.status);
            }
        },
        SessionAction::Clear => {
            store.clear()?;
            println!("session record cleared");
        }
    }
    Ok(())
}
