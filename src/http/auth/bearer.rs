//! Bearer token authentication

use serde::{Deserialize, Serialize};

use super::AUTHORIZATION;

/// Static bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerAuth {
    pub token: String,
}

impl BearerAuth {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    pub fn header_line(&self) -> String {
        bearer_line(&self.token)
    }
}

pub(super) fn bearer_line(token: &str) -> String {
    format!("{}: Bearer {}", AUTHORIZATION, token)
}
