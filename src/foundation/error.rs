/// Convenience result type used across median-adapt.
pub type AttackResult<T> = Result<T, AttackError>;

/// Top-level error taxonomy used by attack and defense APIs.
#[derive(thiserror::Error, Debug)]
pub enum AttackError {
    /// Invalid caller-provided data (shapes, ranges, bandwidths).
    #[error("validation error: {0}")]
    Validation(String),

    /// A combination of options that is recognised but not supported.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfig(String),

    /// An internal invariant was violated while resolving a window.
    #[error("internal consistency error: {0}")]
    Consistency(String),

    /// Pixel layout or codec problems.
    #[error("image error: {0}")]
    Image(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AttackError {
    /// Build an [`AttackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AttackError::UnsupportedConfig`] value.
    pub fn unsupported_config(msg: impl Into<String>) -> Self {
        Self::UnsupportedConfig(msg.into())
    }

    /// Build an [`AttackError::Consistency`] value.
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    /// Build an [`AttackError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
