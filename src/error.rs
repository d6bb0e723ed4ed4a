//! Ошибки предобработки и инференса

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepError {
    /// Входной файл отсутствует или повреждён. Предобработка не запускается.
    #[error("parse error: {0}")]
    Parse(String),

    /// Вырожденная или пустая спецификация предобработки.
    #[error("invalid preprocessing spec: {0}")]
    InvalidSpec(String),

    #[error("feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),
}

pub type Result<T> = std::result::Result<T, PrepError>;

impl From<csv::Error> for PrepError {
    fn from(err: csv::Error) -> Self {
        PrepError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        PrepError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for PrepError {
    fn from(err: std::io::Error) -> Self {
        PrepError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_becomes_parse_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: PrepError = io_err.into();
        assert!(matches!(err, PrepError::Parse(_)));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn feature_mismatch_display() {
        let err = PrepError::FeatureMismatch { expected: 5, got: 3 };
        assert_eq!(err.to_string(), "feature mismatch: expected 5 features, got 3");
    }
}
