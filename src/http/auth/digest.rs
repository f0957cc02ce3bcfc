//! Digest authentication placeholder
//!
//! Request text carries `Digest base64(username:password)`. This is NOT the
//! RFC 7616 challenge/response exchange: there is no realm, nonce or hash,
//! and servers implementing real digest authentication will reject it. The
//! engine is expected to perform the actual handshake when it sends the
//! request.

use serde::{Deserialize, Serialize};

use super::{encode_credentials, AUTHORIZATION};

/// Digest authentication credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestAuth {
    pub username: String,
    pub password: String,
}

impl DigestAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Placeholder header line, see module docs
    pub fn header_line(&self) -> String {
        format!(
            "{}: Digest {}",
            AUTHORIZATION,
            encode_credentials(&self.username, &self.password)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_placeholder_is_base64_credentials() {
        let auth = DigestAuth::new("user", "pass");
        assert_eq!(auth.header_line(), "Authorization: Digest dXNlcjpwYXNz");
    }
}
