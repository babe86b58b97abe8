//! Append-only per-ticker audit log of extracted batches.

use chrono::{DateTime, Utc};
use daybar_types::{RawBar, Ticker};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Writes each extracted batch as one JSON line to `<dir>/<TICKER>.json`.
///
/// The file is never rotated or truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLog {
    dir: PathBuf,
}

#[derive(Serialize)]
struct AuditEntry<'a> {
    ticker: &'a Ticker,
    written_at: DateTime<Utc>,
    count: usize,
    bars: &'a [RawBar],
}

impl AuditLog {
    /// Creates an audit log rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file a ticker's batches are appended to.
    #[must_use]
    pub fn path_for(&self, ticker: &Ticker) -> PathBuf {
        self.dir.join(format!("{ticker}.json"))
    }

    /// Appends one batch as a single JSON line, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn append(&self, ticker: &Ticker, bars: &[RawBar]) -> io::Result<()> {
        let entry = AuditEntry {
            ticker,
            written_at: Utc::now(),
            count: bars.len(),
            bars,
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(ticker))
            .await?;
        file.write_all(&line).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bars(ticker: &Ticker) -> Vec<RawBar> {
        vec![
            RawBar::new(ticker.clone(), 1.0, 2.0, 0.5, 1.5, Some(100.0), 1_727_740_800_000),
            RawBar::new(ticker.clone(), 1.5, 2.5, 1.0, 2.0, None, 1_727_827_200_000),
        ]
    }

    #[test]
    fn test_path_for() {
        let log = AuditLog::new("/var/log/daybar");
        let ticker = Ticker::new("aapl").unwrap();
        assert_eq!(log.path_for(&ticker), PathBuf::from("/var/log/daybar/AAPL.json"));
    }

    #[tokio::test]
    async fn test_append_writes_one_line_per_batch() {
        let temp_dir = TempDir::new().unwrap();
        let log = AuditLog::new(temp_dir.path().join("audit"));
        let ticker = Ticker::new("AAPL").unwrap();

        log.append(&ticker, &bars(&ticker)).await.unwrap();
        log.append(&ticker, &bars(&ticker)[..1]).await.unwrap();

        let contents = std::fs::read_to_string(log.path_for(&ticker)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["ticker"], "AAPL");
        assert_eq!(first["count"], 2);
        assert_eq!(first["bars"][1]["volume"], serde_json::Value::Null);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["count"], 1);
    }

    #[tokio::test]
    async fn test_append_fails_when_dir_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let log = AuditLog::new(&blocker);
        let ticker = Ticker::new("AAPL").unwrap();
        assert!(log.append(&ticker, &bars(&ticker)).await.is_err());
    }
}
