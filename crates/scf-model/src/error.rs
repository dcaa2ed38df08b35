//! Error types for SCF model parsing

/// Errors raised while interpreting catalog identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Token does not name a supported framework
    #[error("unknown framework: '{0}'")]
    UnknownFramework(String),

    /// Token does not name a supported core level
    #[error("unknown core level: '{0}'")]
    UnknownCoreLevel(String),

    /// Token is neither a framework nor a core level
    #[error("unknown filter key: '{0}'")]
    UnknownFilterKey(String),
}
