//! Basic authentication

use serde::{Deserialize, Serialize};

use super::{encode_credentials, AUTHORIZATION};

/// Basic authentication credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn header_line(&self) -> String {
        format!(
            "{}: Basic {}",
            AUTHORIZATION,
            encode_credentials(&self.username, &self.password)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header() {
        let auth = BasicAuth::new("user", "pass");
        assert_eq!(auth.header_line(), "Authorization: Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_empty_password_keeps_separator() {
        // "admin:"
        let auth = BasicAuth::new("admin", "");
        assert_eq!(auth.header_line(), "Authorization: Basic YWRtaW46");
    }
}
