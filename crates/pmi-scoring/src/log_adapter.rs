//! Bridge from a host log channel into a wrapped model's log

use pmi_core::{LogLevel, LogSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Log handle given to PMML models.
///
/// Clones share the same sink and the same open/closed state, so the scorer
/// can close the adapter it handed to the model once the run is done.
#[derive(Clone)]
pub struct LogAdapter {
    inner: Arc<LogAdapterInner>,
}

struct LogAdapterInner {
    sink: Arc<dyn LogSink>,
    closed: AtomicBool,
}

impl LogAdapter {
    /// Create an adapter writing to the given sink
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            inner: Arc::new(LogAdapterInner {
                sink,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Write a debug message
    pub fn log_debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    /// Write a basic (informational) message
    pub fn log_basic(&self, message: &str) {
        self.write(LogLevel::Basic, message);
    }

    /// Write an error message
    pub fn log_error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }

    /// Stop forwarding messages; later writes are dropped
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(channel = %self.inner.sink.channel(), "Closed model log adapter");
        }
    }

    /// Whether the adapter has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn write(&self, level: LogLevel, message: &str) {
        if !self.is_closed() {
            self.inner.sink.log(level, message);
        }
    }
}

impl std::fmt::Debug for LogAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogAdapter")
            .field("channel", &self.inner.sink.channel())
            .field("closed", &self.is_closed())
            .finish()
    }
}
