use thiserror::Error;

/// Errors surfaced by the query observer.
///
/// Nothing here is fatal to the caller: configuration errors are returned
/// synchronously from setters, and value-rendering errors are caught inside
/// `QueryLogger::record` and degrade to omitting the offending detail.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// A configuration setter or settings file carried an out-of-range value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A bound value could not be rendered as printable text.
    #[error("value rendering failed: {0}")]
    ValueRender(String),
}
