//! JWT authentication

use serde::{Deserialize, Serialize};

use super::bearer::bearer_line;
use super::TokenIssuer;
use crate::error::CodecError;

/// JWT authentication, either with a supplied token or one minted on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtAuth {
    pub mode: JwtMode,

    /// Token sent in `use` mode; ignored when generating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JwtMode {
    /// Ask the injected [`TokenIssuer`] for a fresh token
    Generate,
    /// Send the caller's token as-is
    Use,
}

impl JwtAuth {
    pub fn generate() -> Self {
        Self {
            mode: JwtMode::Generate,
            token: None,
        }
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            mode: JwtMode::Use,
            token: Some(token.to_string()),
        }
    }

    /// Waits on the issuer in `generate` mode; a missing or failing issuer
    /// fails the encode.
    pub fn header_line(&self, issuer: Option<&dyn TokenIssuer>) -> Result<String, CodecError> {
        match self.mode {
            JwtMode::Use => Ok(bearer_line(self.token.as_deref().unwrap_or_default())),
            JwtMode::Generate => {
                let issuer = issuer.ok_or(CodecError::MissingTokenIssuer)?;
                let token = issuer.issue_token().map_err(|e| {
                    tracing::warn!(error = %e, "Token issuer failed");
                    CodecError::TokenIssuer(e.to_string())
                })?;
                Ok(bearer_line(&token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::auth::StaticToken;

    #[test]
    fn test_use_mode_sends_supplied_token() {
        let auth = JwtAuth::with_token("eyJ.abc.def");
        assert_eq!(
            auth.header_line(None).unwrap(),
            "Authorization: Bearer eyJ.abc.def"
        );
    }

    #[test]
    fn test_generate_mode_asks_issuer() {
        let issuer = StaticToken::new("minted");
        let line = JwtAuth::generate().header_line(Some(&issuer)).unwrap();
        assert_eq!(line, "Authorization: Bearer minted");
    }

    #[test]
    fn test_generate_without_issuer_fails() {
        let err = JwtAuth::generate().header_line(None).unwrap_err();
        assert_eq!(err, CodecError::MissingTokenIssuer);
    }

    #[test]
    fn test_failing_issuer_is_surfaced() {
        let issuer = || -> anyhow::Result<String> { anyhow::bail!("signing key unavailable") };
        let err = JwtAuth::generate().header_line(Some(&issuer)).unwrap_err();
        assert_eq!(
            err,
            CodecError::TokenIssuer("signing key unavailable".to_string())
        );
    }
}
