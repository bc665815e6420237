use crate::TransportError;

/// Error type returned by this crate.
///
/// `Transport` and `InvalidStatus` describe why a single attempt failed; their
/// `Display` text is what ends up in [`FailedAttempt::error`](crate::FailedAttempt).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The transport could not produce a response.
    #[error("{0}")]
    Transport(#[from] TransportError),
    /// A response arrived but its status failed the success predicate.
    #[error("Invalid status code: {status}")]
    InvalidStatus { status: u16 },
    /// The reqwest client could not be constructed from the given options.
    #[error("client build error: {0}")]
    Build(reqwest::Error),
}

impl FetchError {
    /// Response details carried by the failure, if any.
    pub(crate) fn embedded_response(&self) -> Option<&crate::ErrorResponse> {
        match self {
            Self::Transport(err) => err.response.as_ref(),
            Self::InvalidStatus { .. } | Self::Build(_) => None,
        }
    }
}
