//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;
use crate::research::parse::ParseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("console error: {0}")]
    Console(String),

    #[error("llm error: {0}")]
    Llm(#[from] ProviderError),

    #[error("unexpected model output: {0}")]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(!e.to_string().is_empty());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn session_error_display() {
        let e = AppError::Session("bad id".into());
        assert!(e.to_string().contains("bad id"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = ProviderError::Request("HTTP 500".into()).into();
        assert!(e.to_string().starts_with("llm error"));
        assert!(e.to_string().contains("HTTP 500"));
    }

    #[test]
    fn parse_error_converts() {
        let e: AppError = ParseError::Plan("expected value".into()).into();
        assert!(e.to_string().contains("unexpected model output"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
