//! Log sinks handed from the host pipeline to wrapped models

use std::fmt;

/// Severity of a message written to a [`LogSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Basic,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => f.write_str("debug"),
            Self::Basic => f.write_str("basic"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Destination for log output owned by the host (e.g. a step's log channel)
pub trait LogSink: Send + Sync {
    /// Write one message
    fn log(&self, level: LogLevel, message: &str);

    /// Name of the channel, used to tag forwarded messages
    fn channel(&self) -> &str;
}

/// Log sink that forwards to `tracing` under a channel name
#[derive(Debug, Clone)]
pub struct TracingLogSink {
    channel: String,
}

impl TracingLogSink {
    /// Create a sink for the given channel
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(channel = %self.channel, "{}", message),
            LogLevel::Basic => tracing::info!(channel = %self.channel, "{}", message),
            LogLevel::Error => tracing::error!(channel = %self.channel, "{}", message),
        }
    }

    fn channel(&self) -> &str {
        &self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_sink_keeps_channel() {
        let sink = TracingLogSink::new("Weka Scoring");
        assert_eq!(sink.channel(), "Weka Scoring");
        sink.log(LogLevel::Basic, "no subscriber installed");
        assert!(LogLevel::Debug < LogLevel::Error);
        assert_eq!(LogLevel::Basic.to_string(), "basic");
    }
}
