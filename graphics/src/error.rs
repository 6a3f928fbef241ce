//! Graphics error types.

use thiserror::Error;

/// Errors that can occur in the graphics system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// A compiler-level enumeration value has no device-level counterpart.
    #[error("unmapped {table} value {value}")]
    UnmappedEnum { table: &'static str, value: u32 },
    /// A pass reported a render state this layer does not understand.
    #[error("unhandled render state type {0}")]
    UnhandledRenderState(u32),
    /// A pass reported a sampler state this layer does not understand.
    #[error("unhandled sampler state type {0}")]
    UnhandledSamplerState(u32),
    /// A sampler names a texture parameter that was never declared.
    #[error("sampler {0:?} has no associated texture parameter")]
    SamplerLookupMiss(String),
    /// The compiled effect descriptor is structurally invalid.
    #[error("malformed effect: {0}")]
    MalformedEffect(String),
    /// A requested feature is not supported.
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The object was used after being disposed.
    #[error("{0} has been disposed")]
    Disposed(&'static str),
    /// The native context reported a failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Broad classification of a [`GraphicsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The effect was produced by an incompatible compiler.
    Compatibility,
    /// A sampler-to-texture lookup failed at apply time.
    LookupMiss,
    /// The effect descriptor has impossible counts or dangling references.
    Malformed,
    /// The native context lacks a required capability.
    Capability,
    /// The caller violated an API contract.
    Usage,
    /// The native context failed.
    Backend,
}

impl GraphicsError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnmappedEnum { .. }
            | Self::UnhandledRenderState(_)
            | Self::UnhandledSamplerState(_) => ErrorKind::Compatibility,
            Self::SamplerLookupMiss(_) => ErrorKind::LookupMiss,
            Self::MalformedEffect(_) => ErrorKind::Malformed,
            Self::FeatureNotSupported(_) => ErrorKind::Capability,
            Self::InvalidParameter(_) | Self::Disposed(_) => ErrorKind::Usage,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }
}

/// Result alias used throughout the graphics crate.
pub type GraphicsResult<T> = Result<T, GraphicsError>;
