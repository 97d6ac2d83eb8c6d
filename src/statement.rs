//! Statement shapes consumed by the query logger.
//!
//! The execution layer owns these values; the logger only borrows them for
//! the duration of one `record` call. Keeping the shapes in a single closed
//! enum lets one recursive render function own the shared-budget invariant
//! instead of scattering it across per-type methods.

use crate::error::ObserverError;

/// Batch flavor, mirrored in the rendered `BEGIN ... BATCH` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Logged,
    Unlogged,
    Counter,
}

/// One value bound to a prepared statement placeholder.
#[derive(Debug, Clone)]
pub struct BoundValue {
    /// Raw serialized bytes; `None` or empty means SQL NULL.
    pub raw: Option<Vec<u8>>,
    /// Type name consumed by the [`ValueFormatter`] capability.
    pub type_name: String,
}

impl BoundValue {
    pub fn new(raw: impl Into<Vec<u8>>, type_name: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()), type_name: type_name.into() }
    }

    /// A value bound to SQL NULL.
    pub fn null(type_name: impl Into<String>) -> Self {
        Self { raw: None, type_name: type_name.into() }
    }

    /// NULL means absent raw bytes, or present but zero-length.
    pub fn is_null(&self) -> bool {
        self.raw.as_ref().is_none_or(|raw| raw.is_empty())
    }
}

/// A completed statement as seen by the logger.
#[derive(Debug, Clone)]
pub enum Statement {
    /// Plain query string.
    Simple { query: String },
    /// Prepared statement with concrete values attached to its placeholders.
    /// `names` and `values` share the original binding order.
    Bound {
        query: String,
        names: Vec<String>,
        values: Vec<BoundValue>,
    },
    /// Ordered group of statements submitted as one logical unit.
    Batch { kind: BatchKind, members: Vec<Statement> },
    /// Driver-internal bookkeeping query; never rendered or logged.
    Internal,
}

impl Statement {
    pub fn simple(query: impl Into<String>) -> Self {
        Self::Simple { query: query.into() }
    }

    pub fn bound(
        query: impl Into<String>,
        names: Vec<String>,
        values: Vec<BoundValue>,
    ) -> Self {
        Self::Bound { query: query.into(), names, values }
    }

    pub fn batch(kind: BatchKind, members: Vec<Statement>) -> Self {
        Self::Batch { kind, members }
    }
}

/// Capability for turning a bound value's raw bytes into printable text.
///
/// Deserialization lives outside this crate; implementations typically
/// dispatch on [`BoundValue::type_name`] and decode the raw bytes
/// accordingly. Called only for non-NULL values, and only when a channel's
/// detail tier is enabled.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &BoundValue) -> Result<String, ObserverError>;
}
