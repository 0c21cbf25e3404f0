//! Error types for adyen-hpp.
//!
//! Only construction can fail. Signature checks, reference checks and
//! canonicalization report their result as plain values.

/// Result type for gateway construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building a gateway from its options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// One or more required options are missing or empty.
    #[error("The {} fields are required.", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    /// The sandbox option is absent or not a boolean.
    #[error("The boolean sandbox option must be set.")]
    SandboxNotBoolean,

    /// A signing key is not valid hex.
    #[error("invalid hex in {option}: {source}")]
    InvalidKey {
        /// The option holding the key.
        option: &'static str,
        /// The decoding failure.
        #[source]
        source: hex::FromHexError,
    },

    /// The notification method is neither `basic` nor `hmac`.
    #[error("unknown notification method: {0}")]
    UnknownNotificationMethod(String),

    /// HMAC notifications were requested without a notification key.
    #[error("notification_method is hmac but notification_hmac is not set")]
    MissingNotificationKey,

    /// The options document could not be read.
    #[error("failed to read options: {0}")]
    Io(#[from] std::io::Error),

    /// The options document is not valid JSON of the expected shape.
    #[error("invalid options document: {0}")]
    Parse(#[from] serde_json::Error),
}
