use chrono::Utc;
use clap::Subcommand;
use roombook_core::SyncStatusInsert;

use super::{backend, integration, print_json, CmdResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Show the latest synchronization status
    Status,
    /// Record a synchronization outcome
    Record {
        /// Status value, e.g. ok or error
        #[arg(long, default_value = "ok")]
        status: String,
        /// Optional error message
        #[arg(long)]
        message: Option<String>,
    },
}

pub async fn run(action: SyncAction) -> CmdResult {
    match action {
        SyncAction::Status => {
            let status = integration()?.get_sync_status().await;
            print_json(&status)?;
        }
        SyncAction::Record { status, message } => {
            let stored = backend()?
                .record_sync_status(&SyncStatusInsert {
                    status,
                    last_sync: Utc::now(),
                    error_message: message,
                })
                .await?;
            print_json(&stored)?;
        }
    }
    Ok(())
}
