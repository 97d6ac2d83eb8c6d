//! Post-execution query observability for database clients.
//!
//! After every query completes — normally, slowly, with a timeout, or with
//! an error — [`QueryLogger::record`] renders a length-bounded description
//! of the executed statement (and optionally its bound values) and routes
//! the line to one of four independently gated channels. Configuration is
//! live: threshold and truncation changes take effect on the next call.

pub mod channel;
pub mod config;
pub mod error;
pub mod logger;
pub mod outcome;
pub mod render;
pub mod statement;

pub use channel::{ChannelKind, ChannelSink, Channels};
pub use config::{load_settings, ObservabilityConfig, Settings};
pub use error::ObserverError;
pub use logger::QueryLogger;
pub use outcome::{classify, Outcome};
pub use render::{RenderBudget, TRUNCATED_OUTPUT, UNLIMITED};
pub use statement::{BatchKind, BoundValue, Statement, ValueFormatter};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Note: This function can only be called once. The query channels sit on
/// their own targets (`query_observer::normal` and friends), so enable them
/// per channel, e.g. `RUST_LOG=info,query_observer::slow=warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
