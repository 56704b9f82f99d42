//! Error types for the counterparty model

/// Model-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Field name not recognised
    #[error("unknown field: '{0}'")]
    UnknownField(String),

    /// Identifier is empty
    #[error("counterparty id must not be empty")]
    EmptyId,
}
