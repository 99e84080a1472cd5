use thiserror::Error;

/// Rejected [`EngineBuilder`](super::engine::EngineBuilder) configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("operator '{name}' is built in and cannot be replaced")]
    BuiltinOperator { name: String },

    #[error("operator '{name}' is registered twice")]
    DuplicateOperator { name: String },

    #[error("invalid operator name '{name}'")]
    InvalidOperatorName { name: String },

    #[error("maximum `valid` nesting depth must be at least 1")]
    ZeroDepth,

    #[error("message value placeholder must not be empty")]
    EmptyPlaceholder,
}
