//! Error types for reply classification.

/// Error type for client-detected protocol violations.
///
/// Server-reported errors (`ERROR`, `CLIENT ERROR ...`, `SERVER ERROR ...`)
/// are an expected protocol outcome and classify as an error-status
/// [`Reply`](crate::Reply), never as a value of this type. These variants
/// cover replies the client cannot make sense of: a protocol or version
/// mismatch, or a framing bug in the transport. They are terminal for the
/// response cycle and never retried here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The line matches no known success token or error shape for the
    /// active command family.
    #[error("Unexpected format in response")]
    UnexpectedFormat,

    /// Invalid protocol format in a retrieval reply (static message).
    #[error("protocol error: {0}")]
    Protocol(&'static str),

    /// Invalid number format in a reply line.
    #[error("invalid number")]
    InvalidNumber,
}
