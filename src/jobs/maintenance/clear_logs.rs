use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::init::state::ServerState;

/// Rolled log files older than this are removed.
pub const LOG_RETENTION: Duration = Duration::days(7);

pub fn is_stale(modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - modified > LOG_RETENTION
}

/// Returns `(removed, kept)` file counts.
pub fn clear_logs_in(logs_dir: &Path, now: DateTime<Utc>) -> (usize, usize) {
    let (mut removed, mut kept): (usize, usize) = (0, 0);

    for entry in walkdir::WalkDir::new(logs_dir).max_depth(4) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                error!(logs_dir = %logs_dir.display(), error = %err, "Error walking logs directory");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let modified = match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(modified)) => DateTime::<Utc>::from(modified),
            Ok(Err(err)) => {
                error!(log_file_path = %entry.path().display(), error = %err, "Could not read log file mtime");
                continue;
            }
            Err(err) => {
                error!(log_file_path = %entry.path().display(), error = %err, "Could not stat log file");
                continue;
            }
        };

        if !is_stale(modified, now) {
            kept += 1;
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                removed += 1;
                info!(log_file_path = %entry.path().display(), "Old log file removed");
            }
            Err(err) => {
                error!(log_file_path = %entry.path().display(), error = %err, "Failed to remove old log file");
            }
        }
    }

    (removed, kept)
}

pub async fn clear_old_logs(state: Arc<ServerState>) {
    let logs_dir = state.get_logs_dir().to_owned();

    match tokio::task::spawn_blocking(move || clear_logs_in(Path::new(&logs_dir), Utc::now())).await {
        Ok((removed, kept)) => info!(removed, kept, "Old logs cleared"),
        Err(e) => error!(error = %e, "Log clearing task panicked"),
    }
}
