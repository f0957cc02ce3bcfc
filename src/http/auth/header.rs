//! Schemes that write a caller-chosen header

use serde::{Deserialize, Serialize};

/// API key given as a complete `Name: Value` header line.
///
/// The line is written verbatim. Decoding only recognizes `Name: Value` with
/// a single space after the colon, so a line such as `X-Api-Key:abc` is
/// encoded but does not come back from decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyAuth {
    pub key_header_line: String,
}

impl ApiKeyAuth {
    pub fn new(key_header_line: &str) -> Self {
        Self {
            key_header_line: key_header_line.to_string(),
        }
    }

    /// The supplied line, verbatim
    pub fn header_line(&self) -> String {
        self.key_header_line.clone()
    }
}

/// Arbitrary header key and value. An empty key produces a line decode
/// cannot read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAuth {
    pub header_key: String,
    pub header_value: String,
}

impl CustomAuth {
    pub fn new(header_key: &str, header_value: &str) -> Self {
        Self {
            header_key: header_key.to_string(),
            header_value: header_value.to_string(),
        }
    }

    pub fn header_line(&self) -> String {
        format!("{}: {}", self.header_key, self.header_value)
    }
}
