//! Progress and log events emitted by a running job.
//!
//! Events travel over an unbounded channel so the pipeline never waits on
//! its consumer. A dropped receiver is ignored.

use crate::pipeline::job::JobStatus;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Event emitted by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Sets processed so far out of the requested total
    Progress {
        /// Sets processed
        completed: usize,
        /// Sets requested
        requested: usize,
    },
    /// Human-readable log line
    Log(String),
    /// Final event of a run
    Finished(JobStatus),
}

/// Create a connected reporter/receiver pair.
pub fn progress_channel() -> (ProgressReporter, UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressReporter::new(Some(tx)), rx)
}

/// Non-blocking event sink; a no-op when no channel is attached.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    /// Wrap an optional sender.
    pub fn new(tx: Option<UnboundedSender<ProgressEvent>>) -> Self {
        Self { tx }
    }

    /// Reporter that drops every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Emit a progress update.
    pub fn progress(&self, completed: usize, requested: usize) {
        self.send(ProgressEvent::Progress {
            completed,
            requested,
        });
    }

    /// Emit a log line.
    pub fn log(&self, line: impl Into<String>) {
        self.send(ProgressEvent::Log(line.into()));
    }

    /// Emit the final status.
    pub fn finished(&self, status: JobStatus) {
        self.send(ProgressEvent::Finished(status));
    }

    fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // receiver gone: the job keeps running
            let _ = tx.send(event);
        }
    }
}

impl From<Option<UnboundedSender<ProgressEvent>>> for ProgressReporter {
    fn from(tx: Option<UnboundedSender<ProgressEvent>>) -> Self {
        Self::new(tx)
    }
}

impl From<UnboundedSender<ProgressEvent>> for ProgressReporter {
    fn from(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self::new(Some(tx))
    }
}
