//! Score Persistence
//!
//! Fire-and-forget score recording. Sessions push records onto an unbounded
//! queue; a worker task drains it into a [`ScoreSink`], running each write on
//! the blocking pool. Sink failures are logged and never reach the session.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// One saved score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Player name as submitted
    pub name: String,
    /// Score as submitted
    pub score: f64,
    /// When the server received it
    pub recorded_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Record stamped with the current time.
    pub fn now(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
            recorded_at: Utc::now(),
        }
    }
}

/// Score sink errors.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Underlying storage failed.
    #[error("score storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded.
    #[error("score encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A writer panicked while holding the sink.
    #[error("score sink poisoned")]
    Poisoned,
}

/// Destination for saved scores.
///
/// `record` may block; the worker calls it from the blocking pool.
pub trait ScoreSink: Send + Sync {
    /// Store one record.
    fn record(&self, record: &ScoreRecord) -> Result<(), ScoreError>;

    /// Whether records accumulate in process memory.
    fn holds_in_memory(&self) -> bool {
        false
    }
}

/// Sink for an optional log path: the JSON-lines file when set, otherwise
/// the log-only sink.
pub fn open_score_sink(path: Option<&Path>) -> Result<Arc<dyn ScoreSink>, ScoreError> {
    match path {
        Some(path) => {
            info!("Recording scores to {}", path.display());
            Ok(Arc::new(JsonlScoreSink::open(path)?))
        }
        None => {
            info!("No score log configured; scores are only logged");
            Ok(Arc::new(LogScoreSink))
        }
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonlScoreSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlScoreSink {
    /// Open (or create) the log at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreSink for JsonlScoreSink {
    fn record(&self, record: &ScoreRecord) -> Result<(), ScoreError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.file.lock().map_err(|_| ScoreError::Poisoned)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Writes each record to the tracing log and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScoreSink;

impl ScoreSink for LogScoreSink {
    fn record(&self, record: &ScoreRecord) -> Result<(), ScoreError> {
        info!(
            name = %record.name,
            score = record.score,
            recorded_at = %record.recorded_at,
            "score saved"
        );
        Ok(())
    }
}

/// Keeps records in memory. For tests.
#[derive(Debug, Default)]
pub struct MemoryScoreSink {
    records: Mutex<Vec<ScoreRecord>>,
}

impl MemoryScoreSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn records(&self) -> Vec<ScoreRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ScoreSink for MemoryScoreSink {
    fn record(&self, record: &ScoreRecord) -> Result<(), ScoreError> {
        self.records
            .lock()
            .map_err(|_| ScoreError::Poisoned)?
            .push(record.clone());
        Ok(())
    }

    fn holds_in_memory(&self) -> bool {
        true
    }
}

// =============================================================================
// QUEUE + WORKER
// =============================================================================

/// Handle for submitting scores without waiting on storage.
#[derive(Debug, Clone)]
pub struct ScoreQueue {
    tx: mpsc::UnboundedSender<ScoreRecord>,
}

impl ScoreQueue {
    /// Enqueue a score. Returns `false` if the worker has stopped.
    pub fn submit(&self, name: impl Into<String>, score: f64) -> bool {
        self.tx.send(ScoreRecord::now(name, score)).is_ok()
    }
}

/// Start the worker task that drains submitted scores into `sink`.
///
/// The worker exits once every [`ScoreQueue`] clone has been dropped and the
/// queue is empty.
pub fn spawn_score_worker(sink: Arc<dyn ScoreSink>) -> (ScoreQueue, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ScoreRecord>();

    let handle = tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            let sink = Arc::clone(&sink);
            let stored = tokio::task::spawn_blocking(move || {
                let result = sink.record(&record);
                (record, result)
            })
            .await;

            match stored {
                Ok((record, Ok(()))) => debug!(name = %record.name, score = record.score, "score stored"),
                Ok((record, Err(e))) => warn!(name = %record.name, score = record.score, "failed to save score: {}", e),
                Err(e) => error!("score sink task failed: {}", e),
            }
        }
        info!("Score worker stopped");
    });

    (ScoreQueue { tx }, handle)
}
