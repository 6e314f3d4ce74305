//! Append-only failure log
//!
//! Every classified failure becomes one `[timestamp] message` line. This is
//! the terminal sink for pipeline errors, so a failure to write here is
//! returned to the caller instead of being swallowed.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::infrastructure::scrape_error::{CrawlFailure, LogError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

pub struct FailureLogger {
    path: PathBuf,
    // Serializes appends so concurrent units never interleave lines.
    write_lock: Mutex<()>,
}

impl FailureLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line for `failure`
    pub async fn log(&self, failure: &CrawlFailure) -> Result<(), LogError> {
        tracing::error!("{}", failure);

        let line = format!("[{}] {}\n", Local::now().format(TIMESTAMP_FORMAT), single_line(&failure.to_string()));
        self.append(&line).await
    }

    async fn append(&self, line: &str) -> Result<(), LogError> {
        let _guard = self.write_lock.lock().await;
        let log_error = |source| LogError {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(log_error)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(log_error)?;
        file.write_all(line.as_bytes()).await.map_err(log_error)?;
        file.flush().await.map_err(log_error)
    }
}

fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scrape_error::{ExtractionError, RecordField, TransportError};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn appends_timestamped_lines() {
        let dir = TempDir::new().unwrap();
        let logger = FailureLogger::new(dir.path().join("log").join("scraper-error.log"));

        logger
            .log(&CrawlFailure::from(TransportError::HttpError {
                url: "http://shop.test/shirts.php".to_string(),
                status: 404,
            }))
            .await
            .unwrap();
        logger
            .log(&CrawlFailure::from(ExtractionError::new(RecordField::Title, "http://shop.test/shirt.php?id=1", "title is empty")))
            .await
            .unwrap();

        let content = std::fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.starts_with('[')));
        assert!(lines[0].contains("] HTTP request failed with status 404"));
        assert!(lines[1].contains("field: title"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(FailureLogger::new(dir.path().join("scraper-error.log")));

        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let logger = Arc::clone(&logger);
                tokio::spawn(async move {
                    let failure = CrawlFailure::TaskAborted {
                        url: format!("http://shop.test/shirt.php?id={n}"),
                        reason: "panicked".to_string(),
                    };
                    logger.log(&failure).await
                })
            })
            .collect();
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content.lines().count(), 32);
        assert!(content.lines().all(|line| line.ends_with("aborted: panicked")));
    }

    #[tokio::test]
    async fn unwritable_log_is_a_log_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("log");
        std::fs::write(&blocker, "file where a directory should be").unwrap();

        let logger = FailureLogger::new(blocker.join("scraper-error.log"));
        let failure = CrawlFailure::InvalidLink {
            href: "http://[".to_string(),
            reason: "invalid".to_string(),
        };
        let err = logger.log(&failure).await.unwrap_err();
        assert_eq!(err.path, blocker.join("scraper-error.log"));
    }

    #[test]
    fn messages_are_flattened_to_one_line() {
        assert_eq!(single_line("a\nb\r\nc"), "a b  c");
    }
}
