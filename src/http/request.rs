//! HTTP request types

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::auth::{AuthSpec, BasicAuth, BearerAuth};

/// Query parameters in insertion order
pub type QueryParams = IndexMap<String, String>;

/// Structured description of one HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: Method,

    /// Base URL without query string
    pub url: String,

    /// Query parameters
    #[serde(default, alias = "params", alias = "queryParams")]
    pub query_params: QueryParams,

    /// Request headers, duplicates kept in the order they were added
    #[serde(default)]
    pub headers: Headers,

    /// Authentication configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSpec>,

    /// Request body and its format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentSpec>,
}

/// HTTP method.
///
/// Parsing is case-insensitive and never fails: verbs outside the standard
/// set are kept upper-cased as [`Method::Extension`] so that fuzzed request
/// text with odd verbs still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
    Extension(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Extension(verb) => verb,
        }
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "TRACE" => Method::Trace,
            "CONNECT" => Method::Connect,
            other => Method::Extension(other.to_string()),
        }
    }
}

impl From<String> for Method {
    fn from(value: String) -> Self {
        Method::from(value.as_str())
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list.
///
/// Serializes as a JSON/TOML object; repeated names are written and read as
/// repeated keys instead of being merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any existing header with the same name
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Headers {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    headers.push(name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Request body with its declared format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSpec {
    /// Declared format; `None` when the body came from decoded text, which
    /// carries its Content-Type as an ordinary header instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ContentFormat>,

    /// Raw body text
    #[serde(default)]
    pub body: String,
}

impl ContentSpec {
    pub fn new(format: ContentFormat, body: impl Into<String>) -> Self {
        Self {
            format: Some(format),
            body: body.into(),
        }
    }

    /// Body without a declared format
    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            format: None,
            body: body.into(),
        }
    }
}

/// Content format for request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ContentFormat {
    Json,
    Xml,
    Text,
    Form,
}

impl ContentFormat {
    /// MIME type written in the Content-Type header
    pub fn content_type(&self) -> &'static str {
        match self {
            ContentFormat::Json => "application/json",
            ContentFormat::Xml => "application/xml",
            ContentFormat::Text => "text/plain",
            ContentFormat::Form => "application/x-www-form-urlencoded",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Json => "json",
            ContentFormat::Xml => "xml",
            ContentFormat::Text => "text",
            ContentFormat::Form => "form",
        }
    }
}

/// Unknown format names fall back to plain text.
impl From<&str> for ContentFormat {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => ContentFormat::Json,
            "xml" => ContentFormat::Xml,
            "form" => ContentFormat::Form,
            _ => ContentFormat::Text,
        }
    }
}

impl From<String> for ContentFormat {
    fn from(value: String) -> Self {
        ContentFormat::from(value.as_str())
    }
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            method: Method::Get,
            url: String::new(),
            query_params: QueryParams::new(),
            headers: Headers::new(),
            auth: None,
            content: None,
        }
    }
}

impl RequestSpec {
    /// Create a new request
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: Method::from(method),
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Create a builder for constructing requests
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Get the full URL with query parameters
    pub fn full_url(&self) -> String {
        if self.query_params.is_empty() {
            return self.url.clone();
        }

        format!("{}?{}", self.url, encode_query(&self.query_params))
    }

    /// The object shape the fuzzing engine expects under `request_details`.
    ///
    /// Headers collapse into an object here, so a repeated name keeps only
    /// its last value.
    pub fn to_request_details(&self) -> serde_json::Value {
        let headers: serde_json::Map<String, serde_json::Value> = self
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();

        let body = self
            .content
            .as_ref()
            .filter(|c| !c.body.is_empty())
            .map(|c| serde_json::Value::String(c.body.clone()))
            .unwrap_or(serde_json::Value::Null);

        serde_json::json!({
            "method": self.method.as_str(),
            "url": self.url,
            "queryParams": self.query_params,
            "headers": headers,
            "body": body,
        })
    }
}

/// Percent-encode each pair and join with `&`, keeping insertion order
pub(crate) fn encode_query(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builder for constructing requests
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: RequestSpec,
}

impl RequestBuilder {
    /// Set the request method
    pub fn method(mut self, method: &str) -> Self {
        self.request.method = Method::from(method);
        self
    }

    /// Set the request URL
    pub fn url(mut self, url: &str) -> Self {
        self.request.url = url.to_string();
        self
    }

    /// Add a header
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request.headers.push(key, value);
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.request
            .query_params
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Set the body with a declared format
    pub fn content(mut self, format: ContentFormat, body: &str) -> Self {
        self.request.content = Some(ContentSpec::new(format, body));
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        let body = serde_json::to_string(body).unwrap_or_default();
        self.request.content = Some(ContentSpec::new(ContentFormat::Json, body));
        self
    }

    /// Set authentication
    pub fn auth(mut self, auth: AuthSpec) -> Self {
        self.request.auth = Some(auth);
        self
    }

    /// Set basic authentication
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        self.auth(AuthSpec::Basic(BasicAuth::new(username, password)))
    }

    /// Set bearer token
    pub fn bearer_auth(self, token: &str) -> Self {
        self.auth(AuthSpec::Bearer(BearerAuth::new(token)))
    }

    /// Build the request
    pub fn build(self) -> RequestSpec {
        self.request
    }
}
