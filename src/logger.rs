//! Per-call orchestration: classify, gate, render, emit.

use std::error::Error;
use std::sync::Arc;

use crate::channel::Channels;
use crate::config::ObservabilityConfig;
use crate::outcome::{classify, Outcome};
use crate::render::{render_statement, render_value, RenderBudget};
use crate::statement::{BoundValue, Statement, ValueFormatter};

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Logs every completed query onto one of four gated channels.
///
/// `record` runs on the completion path of query execution: it is
/// synchronous, never blocks, never panics, and never propagates an error
/// to the caller. All rendering work is skipped when the selected channel's
/// base gate is closed, and parameter rendering is additionally skipped
/// unless the detail gate is open.
pub struct QueryLogger {
    config: Arc<ObservabilityConfig>,
    channels: Channels,
    formatter: Arc<dyn ValueFormatter>,
}

impl QueryLogger {
    /// Logger emitting through the default tracing-backed channels.
    pub fn new(config: Arc<ObservabilityConfig>, formatter: Arc<dyn ValueFormatter>) -> Self {
        Self::with_channels(config, formatter, Channels::tracing())
    }

    /// Logger with caller-supplied sinks, for tests and embedders with
    /// their own log routing.
    pub fn with_channels(
        config: Arc<ObservabilityConfig>,
        formatter: Arc<dyn ValueFormatter>,
        channels: Channels,
    ) -> Self {
        Self { config, channels, formatter }
    }

    /// Record one completed query.
    ///
    /// `failure` carries the error that ended the query, if any;
    /// `is_timeout` marks that failure as a client/server timeout.
    /// Latency is measured by the caller in nanoseconds.
    pub fn record(
        &self,
        host: &str,
        statement: &Statement,
        failure: Option<&(dyn Error + 'static)>,
        is_timeout: bool,
        latency_nanos: u64,
    ) {
        // driver-internal bookkeeping queries are never logged
        if matches!(statement, Statement::Internal) {
            return;
        }

        let latency_ms = latency_nanos / NANOS_PER_MILLI;
        let outcome = classify(
            latency_ms,
            failure.is_some(),
            is_timeout,
            self.config.slow_query_threshold_ms(),
        );

        let sink = self.channels.get(outcome.channel());
        if !sink.base_enabled() {
            return;
        }

        let mut budget = RenderBudget::new(self.config.max_query_string_length());
        let text = render_statement(statement, &mut budget);

        let mut message = match outcome {
            Outcome::Normal { latency_ms } => {
                format!("Query completed normally on host {host}, took {latency_ms} ms: {text}")
            }
            Outcome::Slow { latency_ms } => {
                format!("Query too slow on host {host}, took {latency_ms} ms: {text}")
            }
            Outcome::Timeout { latency_ms } => {
                format!("Query timed out on host {host} after {latency_ms} ms: {text}")
            }
            Outcome::Error { latency_ms } => {
                format!("Query error on host {host} after {latency_ms} ms: {text}")
            }
        };

        if sink.detail_enabled() {
            if let Statement::Bound { names, values, .. } = statement {
                if !values.is_empty() {
                    self.append_parameters(&mut message, names, values);
                }
            }
        }

        sink.emit(&message, failure);
    }

    /// Append ` [name1:value1, name2:value2, ...]` in binding order. A value
    /// that fails to render is dropped from the suffix rather than failing
    /// the whole line.
    fn append_parameters(&self, message: &mut String, names: &[String], values: &[BoundValue]) {
        let limit = self.config.max_parameter_value_length();
        let mut pairs = String::new();
        for (i, value) in values.iter().enumerate() {
            let name = names.get(i).map(String::as_str).unwrap_or("?");
            match render_value(value, self.formatter.as_ref(), limit) {
                Ok(text) => {
                    if !pairs.is_empty() {
                        pairs.push_str(", ");
                    }
                    pairs.push_str(name);
                    pairs.push(':');
                    pairs.push_str(&text);
                }
                Err(e) => {
                    tracing::warn!(parameter = name, error = %e, "Failed to render bound value");
                }
            }
        }
        if !pairs.is_empty() {
            message.push_str(" [");
            message.push_str(&pairs);
            message.push(']');
        }
    }
}
