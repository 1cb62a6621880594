//! Fatal errors for a generation run.

use thiserror::Error;

/// Errors that abort a generation run.
///
/// Everything recoverable goes through the
/// [`DiagnosticCollector`](crate::DiagnosticCollector) instead.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A class item carries parameters but is not a method.
    #[error("`{class}.{item}` is a {itemtype} but declares parameters")]
    ParamsOnNonMethod {
        class: String,
        item: String,
        itemtype: String,
    },

    /// A strict lookup could not find the namespace it expected.
    #[error("namespace `{0}` does not exist")]
    MissingNamespace(String),

    /// The `extends` chain loops back on itself.
    #[error("cyclic extends chain: {}", .0.join(" -> "))]
    CyclicExtends(Vec<String>),

    /// The documentation document is not valid JSON of the expected shape.
    #[error("invalid documentation data: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file is not valid TOML of the expected shape.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type GenerateResult<T> = Result<T, GenerateError>;
