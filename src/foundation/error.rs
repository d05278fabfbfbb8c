/// Convenience result type used across idmask.
pub type IdMaskResult<T> = Result<T, IdMaskError>;

/// Top-level error taxonomy used by compiler APIs.
#[derive(thiserror::Error, Debug)]
pub enum IdMaskError {
    /// Identifier outside `1..=16`. Rejected at the boundary.
    #[error("invalid identifier: {0} (expected 1..=16)")]
    InvalidIdentifier(u32),

    /// Gray-level preset requested for a channel count outside `0..=4`.
    ///
    /// The clamping lookup never returns this; it is only produced by the strict lookup.
    #[error("unknown preset count: {0} (expected 0..=4)")]
    UnknownPresetCount(usize),

    /// The host graph rejected an operation. Fatal to the current rebuild/build call only.
    #[error("adapter failure: {0}")]
    Adapter(String),

    /// Invalid caller-provided request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IdMaskError {
    /// Build a [`IdMaskError::Adapter`] value.
    pub fn adapter(msg: impl Into<String>) -> Self {
        Self::Adapter(msg.into())
    }

    /// Build a [`IdMaskError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`IdMaskError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors raised by the host graph adapter.
    pub fn is_adapter_failure(&self) -> bool {
        matches!(self, Self::Adapter(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
