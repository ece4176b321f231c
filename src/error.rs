use std::result::Result as StdResult;
use thiserror::Error;
use std::io;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid asset identifier: {0}")]
    InvalidIdentifier(String),
    #[error("No asset name close enough to: {0}")]
    NoFuzzyMatch(String),
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),
    #[error("Invalid numeric input: {0}")]
    InvalidNumericInput(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// Errors the HTTP layer reports to the caller as a bad request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidIdentifier(_)
                | Error::NoFuzzyMatch(_)
                | Error::UpstreamFailure(_)
                | Error::InvalidNumericInput(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::UpstreamFailure(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::UpstreamFailure(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

pub type Result<T> = StdResult<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_client_errors() {
        assert!(Error::InvalidIdentifier("x".into()).is_client_error());
        assert!(Error::NoFuzzyMatch("x".into()).is_client_error());
        assert!(Error::UpstreamFailure("x".into()).is_client_error());
        assert!(Error::InvalidNumericInput("x".into()).is_client_error());
        assert!(!Error::ConfigError("x".into()).is_client_error());
    }

    #[test]
    fn test_json_error_maps_to_upstream_failure() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::UpstreamFailure(_)));
    }
}
