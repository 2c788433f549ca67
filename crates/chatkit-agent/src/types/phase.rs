use std::fmt;

/// Lifecycle of one streaming request.
///
/// `Received -> HistoryLoaded -> Streaming -> {Completed | Cancelled | Failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Received,
    HistoryLoaded,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::HistoryLoaded => "history_loaded",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
