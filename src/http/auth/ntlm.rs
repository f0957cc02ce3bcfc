//! NTLM authentication

use serde::{Deserialize, Serialize};

use super::{encode_credentials, AUTHORIZATION};

/// NTLM credentials, written as `base64(domain\username:password)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtlmAuth {
    #[serde(default)]
    pub domain: String,
    pub username: String,
    pub password: String,
}

impl NtlmAuth {
    pub fn new(domain: &str, username: &str, password: &str) -> Self {
        Self {
            domain: domain.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn header_line(&self) -> String {
        let user = format!("{}\\{}", self.domain, self.username);
        format!(
            "{}: NTLM {}",
            AUTHORIZATION,
            encode_credentials(&user, &self.password)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntlm_header() {
        // base64("CORP\bob:pw")
        let auth = NtlmAuth::new("CORP", "bob", "pw");
        assert_eq!(auth.header_line(), "Authorization: NTLM Q09SUFxib2I6cHc=");
    }
}
