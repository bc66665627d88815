use thiserror::Error;

/// Errors from validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window size must be at least 1")]
    ZeroWindow,

    #[error("window size {got} exceeds the maximum of {max}")]
    WindowTooLarge { got: usize, max: usize },

    #[error("separator token must not be blank")]
    BlankSeparator,

    #[error("invalid generation parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid backend configuration: {0}")]
    InvalidBackend(String),

    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidParameter {
            name: "top_p",
            reason: "must be in (0, 1]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid generation parameter 'top_p': must be in (0, 1]"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = ConfigError::Parse {
            path: "/tmp/config.toml".to_string(),
            message: "expected `=`".to_string(),
        };
        assert!(err.to_string().contains("/tmp/config.toml"));
        assert!(err.to_string().contains("expected `=`"));
    }
}
