//! Append-only interaction log / 仅追加的交互日志
//!
//! Each successful generation becomes one JSON line in a `.jsonl` file.
//! Appends from concurrent requests are serialized through an async mutex so
//! a line is always written whole.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::vault::types::InteractionRecord;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct InteractionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl InteractionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the containing directory / 创建日志目录
    pub async fn ensure_dir(&self) -> Result<(), LogError> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Append one record as a single JSON line.
    /// 以单行JSON追加一条记录
    pub async fn append(&self, prompt: &str, response: &str, model: &str) -> Result<(), LogError> {
        let record = InteractionRecord::new(prompt, response, model);
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _g = self.lock.lock().await;
        self.ensure_dir().await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Append, reporting failures to the operator log instead of the caller.
    /// 追加记录；失败只记录到运维日志，不影响调用方
    pub async fn record(&self, prompt: &str, response: &str, model: &str) {
        if let Err(e) = self.append(prompt, response, model).await {
            tracing::error!(
                path = %self.path.display(),
                model,
                error = %e,
                "failed to append interaction record"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn read_records(path: &Path) -> Vec<InteractionRecord> {
        let text = tokio::fs::read_to_string(path).await.unwrap_or_default();
        text.lines()
            .map(|l| serde_json::from_str::<InteractionRecord>(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_append_creates_dir_and_writes_one_line() {
        let tmp = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(tmp.path().join("nested").join("log.jsonl"));

        log.append("explain entropy", "it is disorder", "stubbed")
            .await
            .unwrap();

        let text = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);

        let v: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["model"], "stubbed");
        assert_eq!(obj["prompt"], "explain entropy");
        assert_eq!(obj["response"], "it is disorder");
        assert!(chrono::DateTime::parse_from_rfc3339(obj["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_non_ascii_is_not_escaped() {
        let tmp = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(tmp.path().join("log.jsonl"));

        log.append("héllo 世界", "• ok", "stubbed").await.unwrap();

        let text = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert!(text.contains("héllo 世界"));
        assert!(text.contains("• ok"));
        assert!(!text.contains("\\u"));
    }

    #[tokio::test]
    async fn test_multiline_response_stays_on_one_line() {
        let tmp = tempfile::tempdir().unwrap();
        let log = InteractionLog::new(tmp.path().join("log.jsonl"));

        log.append("p", "line one\nline two", "stubbed").await.unwrap();
        log.append("q", "r", "phi3:mini").await.unwrap();

        let records = read_records(log.path()).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].response, "line one\nline two");
        assert_eq!(records[1].model, "phi3:mini");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_never_interleave() {
        let tmp = tempfile::tempdir().unwrap();
        let log = Arc::new(InteractionLog::new(tmp.path().join("log.jsonl")));
        let big = "z".repeat(64 * 1024);

        let mut handles = Vec::new();
        for i in 0..32 {
            let log = log.clone();
            let big = big.clone();
            handles.push(tokio::spawn(async move {
                log.append(&format!("prompt-{}", i), &big, "stubbed")
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let records = read_records(log.path()).await;
        assert_eq!(records.len(), 32);
        assert!(records.iter().all(|r| r.response.len() == 64 * 1024));
    }

    #[tokio::test]
    async fn test_record_swallows_io_errors() {
        let tmp = tempfile::tempdir().unwrap();
        // a directory where the file should be makes every open fail
        let path = tmp.path().join("log.jsonl");
        std::fs::create_dir_all(&path).unwrap();
        let log = InteractionLog::new(&path);

        assert!(log.append("p", "r", "stubbed").await.is_err());
        log.record("p", "r", "stubbed").await;
        assert!(path.is_dir());
    }
}
