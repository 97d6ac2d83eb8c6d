//! Output channels and their enablement gates.
//!
//! Each query outcome maps to one of four independent channels. The default
//! sinks forward lines as `tracing` events on fixed targets, so operators
//! gate each channel through the usual `EnvFilter` directives:
//!
//! - `query_observer::normal` — DEBUG for lines, TRACE adds parameter values
//! - `query_observer::slow` — WARN for lines, TRACE adds parameter values
//! - `query_observer::timeout` — ERROR for lines, TRACE adds parameter values
//! - `query_observer::error` — ERROR for lines, TRACE adds parameter values
//!
//! For example `RUST_LOG=query_observer::slow=trace` turns on slow-query
//! lines with full parameter detail while leaving other channels alone.

use std::error::Error;
use tracing::Level;

/// Tracing target for the normal-completion channel.
pub const NORMAL_TARGET: &str = "query_observer::normal";
/// Tracing target for the slow-query channel.
pub const SLOW_TARGET: &str = "query_observer::slow";
/// Tracing target for the timeout channel.
pub const TIMEOUT_TARGET: &str = "query_observer::timeout";
/// Tracing target for the error channel.
pub const ERROR_TARGET: &str = "query_observer::error";

/// Identifies one of the four outcome channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Normal,
    Slow,
    Timeout,
    Error,
}

/// Destination for one channel's lines.
///
/// Both gate checks run before any rendering work, so implementations should
/// keep them cheap. `emit` receives the finished line plus the failure that
/// ended the query, if any.
pub trait ChannelSink: Send + Sync {
    /// Should any line be built for this channel at all.
    fn base_enabled(&self) -> bool;

    /// Should bound parameter values additionally be rendered.
    fn detail_enabled(&self) -> bool;

    /// Emit one finished line. Must not panic.
    fn emit(&self, message: &str, cause: Option<&(dyn Error + 'static)>);
}

/// The four channel sinks used by one logger.
pub struct Channels {
    pub normal: Box<dyn ChannelSink>,
    pub slow: Box<dyn ChannelSink>,
    pub timeout: Box<dyn ChannelSink>,
    pub error: Box<dyn ChannelSink>,
}

impl Channels {
    /// Tracing-backed sinks on the fixed per-channel targets.
    pub fn tracing() -> Self {
        Self {
            normal: Box::new(TracingChannel { kind: ChannelKind::Normal }),
            slow: Box::new(TracingChannel { kind: ChannelKind::Slow }),
            timeout: Box::new(TracingChannel { kind: ChannelKind::Timeout }),
            error: Box::new(TracingChannel { kind: ChannelKind::Error }),
        }
    }

    pub fn get(&self, kind: ChannelKind) -> &dyn ChannelSink {
        match kind {
            ChannelKind::Normal => self.normal.as_ref(),
            ChannelKind::Slow => self.slow.as_ref(),
            ChannelKind::Timeout => self.timeout.as_ref(),
            ChannelKind::Error => self.error.as_ref(),
        }
    }
}

/// Sink that forwards lines to `tracing` events on a fixed target.
struct TracingChannel {
    kind: ChannelKind,
}

impl ChannelSink for TracingChannel {
    fn base_enabled(&self) -> bool {
        match self.kind {
            ChannelKind::Normal => tracing::enabled!(target: NORMAL_TARGET, Level::DEBUG),
            ChannelKind::Slow => tracing::enabled!(target: SLOW_TARGET, Level::WARN),
            ChannelKind::Timeout => tracing::enabled!(target: TIMEOUT_TARGET, Level::ERROR),
            ChannelKind::Error => tracing::enabled!(target: ERROR_TARGET, Level::ERROR),
        }
    }

    fn detail_enabled(&self) -> bool {
        match self.kind {
            ChannelKind::Normal => tracing::enabled!(target: NORMAL_TARGET, Level::TRACE),
            ChannelKind::Slow => tracing::enabled!(target: SLOW_TARGET, Level::TRACE),
            ChannelKind::Timeout => tracing::enabled!(target: TIMEOUT_TARGET, Level::TRACE),
            ChannelKind::Error => tracing::enabled!(target: ERROR_TARGET, Level::TRACE),
        }
    }

    fn emit(&self, message: &str, cause: Option<&(dyn Error + 'static)>) {
        // event! targets must be const, so each channel gets its own arm
        match (self.kind, cause) {
            (ChannelKind::Normal, Some(cause)) => {
                tracing::debug!(target: NORMAL_TARGET, cause = %cause, "{}", message)
            }
            (ChannelKind::Normal, None) => {
                tracing::debug!(target: NORMAL_TARGET, "{}", message)
            }
            (ChannelKind::Slow, Some(cause)) => {
                tracing::warn!(target: SLOW_TARGET, cause = %cause, "{}", message)
            }
            (ChannelKind::Slow, None) => {
                tracing::warn!(target: SLOW_TARGET, "{}", message)
            }
            (ChannelKind::Timeout, Some(cause)) => {
                tracing::error!(target: TIMEOUT_TARGET, cause = %cause, "{}", message)
            }
            (ChannelKind::Timeout, None) => {
                tracing::error!(target: TIMEOUT_TARGET, "{}", message)
            }
            (ChannelKind::Error, Some(cause)) => {
                tracing::error!(target: ERROR_TARGET, cause = %cause, "{}", message)
            }
            (ChannelKind::Error, None) => {
                tracing::error!(target: ERROR_TARGET, "{}", message)
            }
        }
    }
}
