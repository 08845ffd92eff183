//! Progress reporting for long-running strut fusion.

use tracing::debug;

/// Receives `(current, total)` after each fused strut. Purely
/// observational: a sink cannot alter or abort the fusion.
pub trait ProgressSink {
    fn report(&mut self, current: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize),
{
    fn report(&mut self, current: usize, total: usize) {
        self(current, total)
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _current: usize, _total: usize) {}
}

/// Logs a `debug!` line every `every` steps and on the last one.
#[derive(Debug, Clone, Copy)]
pub struct LoggingProgress {
    every: usize,
}

impl LoggingProgress {
    pub fn new(every: usize) -> Self {
        Self { every: every.max(1) }
    }
}

impl Default for LoggingProgress {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ProgressSink for LoggingProgress {
    fn report(&mut self, current: usize, total: usize) {
        if current % self.every == 0 || current == total {
            debug!(current, total, "fusing struts");
        }
    }
}
