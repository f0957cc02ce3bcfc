//! Token issuers for JWT generation
//!
//! The codec never signs anything itself; it calls whatever [`TokenIssuer`]
//! the caller injected.

use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::JwtConfig;

/// Supplies bearer tokens for `jwt` auth in generate mode
pub trait TokenIssuer: Send + Sync {
    fn issue_token(&self) -> Result<String>;
}

impl<F> TokenIssuer for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn issue_token(&self) -> Result<String> {
        self()
    }
}

/// Issuer that always hands out the same token
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl TokenIssuer for StaticToken {
    fn issue_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Signs a fresh JWT on every call
pub struct JwtSigner {
    algorithm: Algorithm,
    key: EncodingKey,
    expiration_secs: i64,
    subject: Option<String>,
    issuer: Option<String>,
    custom: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// Subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Custom claims
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

/// Map an algorithm name onto jsonwebtoken's enum
pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
    let alg = match name.to_uppercase().as_str() {
        "HS256" => Algorithm::HS256,
        "HS384" => Algorithm::HS384,
        "HS512" => Algorithm::HS512,
        "RS256" => Algorithm::RS256,
        "RS384" => Algorithm::RS384,
        "RS512" => Algorithm::RS512,
        "PS256" => Algorithm::PS256,
        "PS384" => Algorithm::PS384,
        "PS512" => Algorithm::PS512,
        "ES256" => Algorithm::ES256,
        "ES384" => Algorithm::ES384,
        "EDDSA" => Algorithm::EdDSA,
        _ => return None,
    };
    Some(alg)
}

impl JwtSigner {
    /// `secret` is the shared secret for HS* and PEM key material otherwise
    pub fn new(secret: &str, algorithm: &str) -> Result<Self> {
        let algorithm = parse_algorithm(algorithm)
            .with_context(|| format!("Unsupported JWT algorithm: {}", algorithm))?;

        let key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                EncodingKey::from_secret(secret.as_bytes())
            }
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => EncodingKey::from_rsa_pem(secret.as_bytes())
                .context("Invalid RSA private key")?,
            Algorithm::ES256 | Algorithm::ES384 => {
                EncodingKey::from_ec_pem(secret.as_bytes()).context("Invalid EC private key")?
            }
            Algorithm::EdDSA => {
                EncodingKey::from_ed_pem(secret.as_bytes()).context("Invalid Ed25519 private key")?
            }
        };

        Ok(Self {
            algorithm,
            key,
            expiration_secs: 3600,
            subject: None,
            issuer: None,
            custom: HashMap::new(),
        })
    }

    /// Build a signer from the `[jwt]` config section, if a secret is set
    pub fn from_config(config: &JwtConfig) -> Result<Option<Self>> {
        let Some(secret) = config.secret.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let mut signer = Self::new(secret, &config.algorithm)?
            .with_expiration(config.expiration_secs)
            .with_claims(config.claims.clone());
        signer.subject = config.subject.clone();
        signer.issuer = config.issuer.clone();

        Ok(Some(signer))
    }

    pub fn with_claims(mut self, claims: HashMap<String, serde_json::Value>) -> Self {
        self.custom = claims;
        self
    }

    pub fn with_subject(mut self, sub: &str) -> Self {
        self.subject = Some(sub.to_string());
        self
    }

    pub fn with_issuer(mut self, iss: &str) -> Self {
        self.issuer = Some(iss.to_string());
        self
    }

    pub fn with_expiration(mut self, exp_seconds: i64) -> Self {
        self.expiration_secs = exp_seconds;
        self
    }

    fn claims(&self) -> JwtClaims {
        let now = chrono::Utc::now().timestamp();
        JwtClaims {
            iat: now,
            exp: now + self.expiration_secs,
            sub: self.subject.clone(),
            iss: self.issuer.clone(),
            custom: self.custom.clone(),
        }
    }
}

impl TokenIssuer for JwtSigner {
    fn issue_token(&self) -> Result<String> {
        let header = Header::new(self.algorithm);
        encode(&header, &self.claims(), &self.key).context("Failed to generate JWT")
    }
}
