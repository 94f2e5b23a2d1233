//! Error types for the `tripcode` crate

/// Errors reported while configuring a [`crate::Hasher`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The secure salt must be exactly [`crate::salt::SECURE_SALT_LEN`] bytes.
    #[error("secure salt must be {expected} bytes long, got {actual}")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
}

/// Errors that make the hashing subsystem unusable as a whole.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SetupError {
    /// No converter to the legacy byte encoding could be opened.
    #[error("can't convert to {label}")]
    ConverterUnavailable {
        /// Encoding label that was looked up.
        label: &'static str,
    },
}

/// Errors returned from a single hashing call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessingError {
    /// The converter failed for a reason other than an unmappable or
    /// incomplete trailing character.
    #[error("trip encoding error")]
    EncodingFailure,

    /// The process-wide hasher could not be set up.
    #[error("tripcode hasher is not available: {0}")]
    Setup(#[from] SetupError),
}

/// Any error produced by this crate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// See [`SetupError`].
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// See [`ProcessingError`].
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}
