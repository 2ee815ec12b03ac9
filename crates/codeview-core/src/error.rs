use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while building or validating an engine configuration.
///
/// The engine itself never fails at runtime: index arithmetic clamps and cache misses rebuild.
/// Every fatal precondition is checked here, before an engine exists.
pub enum ConfigError {
    #[error("invalid engine configuration JSON: {0}")]
    /// The configuration document could not be parsed.
    Json(#[from] serde_json::Error),

    #[error("LSP integration requires a non-empty document path")]
    /// LSP-backed behaviour was requested without a resolvable document path.
    LspWithoutDocumentPath,

    #[error("invalid {name}: {value} (must be finite and positive)")]
    /// A pixel metric is zero, negative or not finite.
    InvalidMetric {
        /// Name of the offending field.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },

    #[error("tab width must be at least 1")]
    /// Tab width of zero.
    InvalidTabWidth,
}
