/// Result alias for `slpa`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by community detection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A parameter is outside its valid domain or could not be parsed.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name, as used in the parameter view.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Parameter keys left over after all known keys were consumed.
    #[error("unrecognized parameters: {}", .0.join(", "))]
    UnrecognizedParameters(Vec<String>),

    /// The run observed a cancellation request and was abandoned.
    #[error("detection cancelled during round {round}")]
    Cancelled {
        /// Round in progress when the request was observed (0 = before the first round).
        round: usize,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::invalid("memorySize", "must be >= 1");
        assert_eq!(err.to_string(), "invalid parameter 'memorySize': must be >= 1");

        let err = Error::UnrecognizedParameters(vec!["bar".into(), "foo".into()]);
        assert_eq!(err.to_string(), "unrecognized parameters: bar, foo");

        let err = Error::Cancelled { round: 3 };
        assert_eq!(err.to_string(), "detection cancelled during round 3");
    }
}
