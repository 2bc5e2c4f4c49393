//! Progress tracking and caller notification
//!
//! Worker pipelines emit completion events into an mpsc channel; a single
//! reporter task consumes them, advances the progress state, and invokes
//! the caller's callback. The single consumer keeps percent/ETA text
//! strictly ordered even though completions arrive from parallel workers.

use std::sync::Arc;

use chrono::{DateTime, Duration as TimeDelta, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::SubscribeMode;
use crate::utils::human_format::format_eta;

/// Caller-supplied progress hook: message plus percent in 0..=100
pub type ProgressCallback = Arc<dyn Fn(&str, u8) + Send + Sync>;

/// Completion event sent by a source pipeline
struct SourceCompleted;

/// Completed/total accounting with a rate-based ETA
#[derive(Debug, Clone)]
pub struct ProgressState {
    completed: usize,
    total: usize,
    started_at: DateTime<Utc>,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            started_at: Utc::now(),
        }
    }

    #[cfg(test)]
    fn with_start(total: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            completed: 0,
            total,
            started_at,
        }
    }

    /// Record one source completion; saturates at `total`
    pub fn record_completion(&mut self) {
        if self.completed < self.total {
            self.completed += 1;
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// Percent complete, floored
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed * 100 / self.total) as u8
    }

    /// Estimated time remaining from the completion rate so far;
    /// `None` until the first completion
    pub fn eta(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        if self.completed == 0 {
            return None;
        }
        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0);
        let remaining_ms = elapsed_ms * self.remaining() as i64 / self.completed as i64;
        Some(TimeDelta::milliseconds(remaining_ms))
    }
}

/// Cloneable sender half handed to each source pipeline
#[derive(Clone)]
pub struct ProgressHandle {
    tx: mpsc::UnboundedSender<SourceCompleted>,
}

impl ProgressHandle {
    /// Signal that one source reached its terminal state
    pub fn source_completed(&self) {
        let _ = self.tx.send(SourceCompleted);
    }
}

/// The reporter task plus the channel feeding it
pub struct ProgressReporter {
    tx: mpsc::UnboundedSender<SourceCompleted>,
    task: JoinHandle<()>,
}

impl ProgressReporter {
    /// Spawn the reporter; emits the start message immediately
    pub fn spawn(total: usize, mode: SubscribeMode, callback: Option<ProgressCallback>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut state = ProgressState::new(total);
            let label = mode.label();

            if let Some(cb) = &callback {
                cb(
                    &format!("Fetching {} sources, {} total", label, total),
                    0,
                );
            }

            while rx.recv().await.is_some() {
                state.record_completion();
                let eta_text = state
                    .eta(Utc::now())
                    .map(|eta| format_eta(eta.num_seconds()))
                    .unwrap_or_else(|| "unknown".to_string());
                let message = format!(
                    "Fetching {} sources, {} remaining, estimated time left: {}",
                    label,
                    state.remaining(),
                    eta_text
                );
                debug!("{} ({}%)", message, state.percent());
                if let Some(cb) = &callback {
                    cb(&message, state.percent());
                }
            }
        });

        Self { tx, task }
    }

    pub fn handle(&self) -> ProgressHandle {
        ProgressHandle {
            tx: self.tx.clone(),
        }
    }

    /// Close the event channel and wait for the final callback to be
    /// delivered
    pub async fn finish(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}
