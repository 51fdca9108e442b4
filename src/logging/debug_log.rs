use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_FILE_NAME: &str = "debug.log";

/// Append-only diagnostic log.
///
/// Writing never fails from the caller's point of view: any I/O error is
/// reported on stderr and the entry is dropped. File appends run on the
/// blocking thread pool so request tasks never do file I/O on an async
/// worker. Every entry is also emitted as a `tracing` debug event.
#[derive(Debug, Clone)]
pub struct DebugLog {
    path: Option<Arc<PathBuf>>,
}

impl DebugLog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(LOG_FILE_NAME);
        tracing::info!("Debug log file: {}", path.display());
        Self {
            path: Some(Arc::new(path)),
        }
    }

    /// A log that only forwards to `tracing`
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub async fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(target: "prodsync::debug_log", "{message}");

        let Some(path) = self.path.clone() else {
            return;
        };

        let written = tokio::task::spawn_blocking(move || append_line(&path, &message)).await;
        match written {
            Ok(Ok(())) => {}
            // stdout carries the protocol, so stderr is the only safe fallback
            Ok(Err(e)) => eprintln!("[LOGGER ERROR] {e}"),
            Err(e) => eprintln!("[LOGGER ERROR] {e}"),
        }
    }
}

fn append_line(path: &Path, message: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "[{}] {message}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
