//! Outcome classification for completed queries.

use crate::channel::ChannelKind;

/// Classified result of one completed query. Exactly one variant per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Completed without failure, at or under the slow threshold.
    Normal { latency_ms: u64 },
    /// Completed without failure, but over the slow threshold.
    Slow { latency_ms: u64 },
    /// Failed with a client or server timeout.
    Timeout { latency_ms: u64 },
    /// Failed with any other error.
    Error { latency_ms: u64 },
}

impl Outcome {
    pub fn latency_ms(&self) -> u64 {
        match *self {
            Self::Normal { latency_ms }
            | Self::Slow { latency_ms }
            | Self::Timeout { latency_ms }
            | Self::Error { latency_ms } => latency_ms,
        }
    }

    /// Channel that receives this outcome's line.
    pub fn channel(&self) -> ChannelKind {
        match self {
            Self::Normal { .. } => ChannelKind::Normal,
            Self::Slow { .. } => ChannelKind::Slow,
            Self::Timeout { .. } => ChannelKind::Timeout,
            Self::Error { .. } => ChannelKind::Error,
        }
    }
}

/// Map a latency measurement and optional failure onto an outcome.
///
/// A timeout failure wins over a generic failure; absent any failure the
/// slow/normal split compares the latency against the caller-supplied
/// threshold. Pure and infallible.
pub fn classify(
    latency_ms: u64,
    failure_present: bool,
    is_timeout: bool,
    threshold_ms: u64,
) -> Outcome {
    if failure_present && is_timeout {
        Outcome::Timeout { latency_ms }
    } else if failure_present {
        Outcome::Error { latency_ms }
    } else if latency_ms > threshold_ms {
        Outcome::Slow { latency_ms }
    } else {
        Outcome::Normal { latency_ms }
    }
}
