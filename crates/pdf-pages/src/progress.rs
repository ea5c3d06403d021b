//! Progress ticks for multi-step operations
//!
//! Ticks are notifications only: sinks must not block and nothing waits on
//! them.

use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

impl Progress {
    pub fn new(current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
        }
    }

    /// Completed fraction in `0.0..=1.0`
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.total.max(1) as f32
    }
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Sink that drops every tick
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

pub type SharedProgress = Arc<dyn ProgressSink>;

pub fn no_progress() -> SharedProgress {
    Arc::new(NoProgress)
}
