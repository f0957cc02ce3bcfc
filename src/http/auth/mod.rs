//! Authentication schemes
//!
//! Each scheme contributes exactly one header line to encoded request text.
//! Dispatch is an exhaustive match over [`AuthSpec`], so a new scheme is a
//! compile-time-checked extension.

mod basic;
mod bearer;
mod digest;
mod header;
mod issuer;
mod jwt;
mod ntlm;

pub use basic::BasicAuth;
pub use bearer::BearerAuth;
pub use digest::DigestAuth;
pub use header::{ApiKeyAuth, CustomAuth};
pub use issuer::{parse_algorithm, JwtClaims, JwtSigner, StaticToken, TokenIssuer};
pub use jwt::{JwtAuth, JwtMode};
pub use ntlm::NtlmAuth;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Name of the header most schemes write
pub const AUTHORIZATION: &str = "Authorization";

/// Authentication configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthSpec {
    None,
    Basic(BasicAuth),
    Bearer(BearerAuth),
    Digest(DigestAuth),
    ApiKey(ApiKeyAuth),
    Jwt(JwtAuth),
    Ntlm(NtlmAuth),
    Custom(CustomAuth),
}

impl AuthSpec {
    /// Tag used in serialized form
    pub fn kind(&self) -> &'static str {
        match self {
            AuthSpec::None => "none",
            AuthSpec::Basic(_) => "basic",
            AuthSpec::Bearer(_) => "bearer",
            AuthSpec::Digest(_) => "digest",
            AuthSpec::ApiKey(_) => "api_key",
            AuthSpec::Jwt(_) => "jwt",
            AuthSpec::Ntlm(_) => "ntlm",
            AuthSpec::Custom(_) => "custom",
        }
    }

    /// Render the header line (without trailing newline) this scheme adds.
    ///
    /// `None` is returned only for [`AuthSpec::None`]. The issuer is consulted
    /// for JWT generation and nothing else.
    pub fn header_line(
        &self,
        issuer: Option<&dyn TokenIssuer>,
    ) -> Result<Option<String>, CodecError> {
        let line = match self {
            AuthSpec::None => return Ok(None),
            AuthSpec::Basic(auth) => auth.header_line(),
            AuthSpec::Bearer(auth) => auth.header_line(),
            AuthSpec::Digest(auth) => auth.header_line(),
            AuthSpec::ApiKey(auth) => auth.header_line(),
            AuthSpec::Jwt(auth) => auth.header_line(issuer)?,
            AuthSpec::Ntlm(auth) => auth.header_line(),
            AuthSpec::Custom(auth) => auth.header_line(),
        };
        Ok(Some(line))
    }
}

/// Base64 of `user:password`, shared by the credential-carrying schemes
pub(crate) fn encode_credentials(user: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", user, password))
}
