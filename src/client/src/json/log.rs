use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogMessageType {
    Stdin,
    Stdout,
    Stderr,
    /// TTY output, which the daemon does not split by stream.
    Raw,
}

/// One line of container output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub log_type: LogMessageType,
    pub content: String,
}

impl LogMessage {
    pub fn new(log_type: LogMessageType, content: impl Into<String>) -> Self {
        Self {
            log_type,
            content: content.into(),
        }
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.log_type, self.content)
    }
}
