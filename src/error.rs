//! Custom error types for apifuzz
//!
//! Provides structured error handling with context propagation
//! and user-friendly error messages.

use thiserror::Error;

/// Main error type for apifuzz operations
#[derive(Error, Debug)]
pub enum ApiFuzzError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request text codec errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Match/hide rule form errors
    #[error("Rule error: {0}")]
    Rules(#[from] RuleFormError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Configuration file not found: {0}")]
    NotFound(String),
}

/// Request codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The first line does not carry both a method and a request target
    #[error("Malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("Unsupported authentication variant: {0}")]
    UnsupportedAuthVariant(String),

    #[error("JWT generation requested but no token issuer is configured")]
    MissingTokenIssuer,

    #[error("Token issuer failed: {0}")]
    TokenIssuer(String),

    #[error("Invalid request form: {0}")]
    InvalidForm(String),
}

/// Errors raised while turning loose form input into rule inputs.
///
/// The rule builder itself never fails; these only come from the layer
/// that maps free-text selections onto the closed criterion set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleFormError {
    #[error("Unknown match criterion: {0}")]
    UnknownCriterion(String),

    #[error("Unknown length unit: {0}")]
    UnknownLengthUnit(String),

    #[error("Unknown sensitive information pattern: {0}")]
    UnknownPattern(String),

    #[error("Unknown match mode: {0}")]
    UnknownMode(String),

    #[error("Payload does not fit criterion {0}")]
    PayloadMismatch(String),
}

impl ApiFuzzError {
    /// Create an error with additional context
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiFuzzError::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ApiFuzzError::Config(e) => format!("Configuration problem: {}", e.user_hint()),
            ApiFuzzError::Codec(e) => format!("Request problem: {}", e.user_hint()),
            ApiFuzzError::Rules(e) => format!("Rule problem: {}", e.user_hint()),
            ApiFuzzError::Io(e) => format!("File system issue: {}", e),
            ApiFuzzError::WithContext { context, source } => {
                format!("{}: {}", context, source)
            }
        }
    }
}

/// Trait for providing user-friendly hints
pub trait UserHint {
    fn user_hint(&self) -> String;
}

impl UserHint for ConfigError {
    fn user_hint(&self) -> String {
        match self {
            ConfigError::ParseError(_) => {
                "The configuration file has invalid syntax. Check for TOML formatting errors.".into()
            }
            ConfigError::ValidationError { field, reason } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            ConfigError::NotFound(path) => {
                format!("Configuration file '{}' not found. Run with --generate-config to create one.", path)
            }
        }
    }
}

impl UserHint for CodecError {
    fn user_hint(&self) -> String {
        match self {
            CodecError::MalformedRequestLine(line) => {
                format!("The first line '{}' must look like 'METHOD /path HTTP/1.1'.", line)
            }
            CodecError::UnsupportedAuthVariant(kind) => {
                format!("Authentication type '{}' cannot be written into request text.", kind)
            }
            CodecError::MissingTokenIssuer => {
                "JWT generation needs signing settings. Add a [jwt] section to the configuration.".into()
            }
            _ => self.to_string(),
        }
    }
}

impl UserHint for RuleFormError {
    fn user_hint(&self) -> String {
        match self {
            RuleFormError::UnknownPattern(name) => {
                format!("'{}' is not in the sensitive information catalogue.", name)
            }
            RuleFormError::UnknownLengthUnit(unit) => {
                format!("Length unit '{}' must be one of bytes, lines, words or chars.", unit)
            }
            _ => self.to_string(),
        }
    }
}

/// Extension trait for adding context to Result types
pub trait ResultExt<T, E> {
    fn with_context<C>(self, context: C) -> Result<T, ApiFuzzError>
    where
        C: Into<String>;
}

impl<T, E> ResultExt<T, E> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T, ApiFuzzError>
    where
        C: Into<String>,
    {
        self.map_err(|e| ApiFuzzError::with_context(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_converts_into_top_level() {
        let err: ApiFuzzError = CodecError::MalformedRequestLine("GET".into()).into();
        assert!(matches!(err, ApiFuzzError::Codec(_)));
        assert!(err.user_message().contains("METHOD /path HTTP/1.1"));
    }

    #[test]
    fn test_with_context_wraps_source() {
        let io: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.with_context("Failed to read request.txt").unwrap_err();
        assert_eq!(err.user_message(), "Failed to read request.txt: gone");
    }
}
