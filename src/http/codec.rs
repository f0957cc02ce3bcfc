//! HTTP/1.1 request text codec
//!
//! Converts between [`RequestSpec`] and the raw request text the fuzzing
//! engine consumes and users hand-edit:
//!
//! ```text
//! POST /users?page=1 HTTP/1.1
//! Host: api.example.com
//! Authorization: Basic dXNlcjpwYXNz
//! Content-Type: application/json
//!
//! {"name": "test"}
//! ```
//!
//! Decoding is deliberately lenient. Only a first line without both a method
//! and a target is an error; malformed header lines are dropped and bad
//! percent escapes are kept literally.

use std::fmt;
use std::sync::Arc;

use super::auth::TokenIssuer;
use super::form::RequestForm;
use super::request::{encode_query, ContentSpec, Headers, Method, QueryParams, RequestSpec};
use crate::config::CodecConfig;
use crate::error::CodecError;

/// Version written on the request line unless configured otherwise
pub const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";

/// Encoder/decoder for request text
#[derive(Clone)]
pub struct RequestCodec {
    http_version: String,
    issuer: Option<Arc<dyn TokenIssuer>>,
}

impl Default for RequestCodec {
    fn default() -> Self {
        Self {
            http_version: DEFAULT_HTTP_VERSION.to_string(),
            issuer: None,
        }
    }
}

impl fmt::Debug for RequestCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCodec")
            .field("http_version", &self.http_version)
            .field("has_issuer", &self.issuer.is_some())
            .finish()
    }
}

impl RequestCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            http_version: config.http_version.clone(),
            issuer: None,
        }
    }

    /// Inject the issuer used for `jwt` auth in generate mode
    pub fn with_issuer(mut self, issuer: Arc<dyn TokenIssuer>) -> Self {
        self.issuer = Some(issuer);
        self
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    /// Render a request as HTTP/1.1 request text.
    ///
    /// Order is fixed: request line, caller headers, the auth header, then
    /// Content-Type, a blank line and the body when one is present.
    pub fn encode(&self, spec: &RequestSpec) -> Result<String, CodecError> {
        let mut text = format!("{} {}", spec.method, spec.url);
        if !spec.query_params.is_empty() {
            text.push('?');
            text.push_str(&encode_query(&spec.query_params));
        }
        text.push(' ');
        text.push_str(&self.http_version);
        text.push('\n');

        for (name, value) in spec.headers.iter() {
            text.push_str(&format!("{}: {}\n", name, value));
        }

        if let Some(auth) = &spec.auth {
            if let Some(line) = auth.header_line(self.issuer.as_deref())? {
                if header_parts(&line).is_none() {
                    tracing::warn!(
                        kind = auth.kind(),
                        line = %line,
                        "Auth line is not a `Name: Value` header and will not survive decode"
                    );
                }
                text.push_str(&line);
                text.push('\n');
            }
        }

        if let Some(content) = &spec.content {
            if let Some(format) = content.format {
                text.push_str(&format!("Content-Type: {}\n", format.content_type()));
            }
            if !content.body.is_empty() {
                text.push('\n');
                text.push_str(&content.body);
            }
        }

        tracing::trace!(
            method = %spec.method,
            url = %spec.url,
            bytes = text.len(),
            "Encoded request"
        );
        Ok(text)
    }

    /// Parse the control panel's request JSON and encode it
    pub fn encode_form(&self, json: &str) -> Result<String, CodecError> {
        let spec = RequestForm::from_json(json)?.into_spec()?;
        self.encode(&spec)
    }

    /// Parse request text back into a [`RequestSpec`]
    pub fn decode(&self, text: &str) -> Result<RequestSpec, CodecError> {
        decode(text)
    }
}

/// Encode with the default codec (HTTP/1.1, no token issuer)
pub fn encode(spec: &RequestSpec) -> Result<String, CodecError> {
    RequestCodec::default().encode(spec)
}

/// Parse request text into a [`RequestSpec`].
///
/// Authorization and Content-Type lines come back as ordinary headers and the
/// body's format is left undeclared, so re-encoding the result reproduces the
/// original text.
pub fn decode(text: &str) -> Result<RequestSpec, CodecError> {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or("").trim_end_matches('\r');
    let request_line = RequestLine::parse(first)?;

    let (url, query) = match request_line.target.split_once('?') {
        Some((url, query)) => (url.to_string(), Some(query)),
        None => (request_line.target.clone(), None),
    };
    let query_params = query.map(parse_query).unwrap_or_default();

    let mut headers = Headers::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for raw in lines {
        if in_body {
            body_lines.push(raw);
            continue;
        }

        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            in_body = true;
            continue;
        }

        match header_parts(line) {
            Some((name, value)) => headers.push(name, value),
            None => tracing::trace!(line, "Skipping malformed header line"),
        }
    }

    let body = body_lines.join("\n");
    let body = body.trim();
    let content = (!body.is_empty()).then(|| ContentSpec::raw(body));

    Ok(RequestSpec {
        method: request_line.method,
        url,
        query_params,
        headers,
        auth: None,
        content,
    })
}

/// The first line of request text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// URL including any query string
    pub target: String,
    /// Protocol version, informational only
    pub version: Option<String>,
}

impl RequestLine {
    /// Split a request line on single spaces into method, target and version.
    ///
    /// Only a line with fewer than two tokens is malformed. Empty tokens are
    /// kept, so `"GET  HTTP/1.1"` has an empty target, as encode writes it.
    pub fn parse(line: &str) -> Result<Self, CodecError> {
        let mut parts = line.split(' ');
        let method = parts.next();
        let target = parts.next();

        match (method, target) {
            (Some(method), Some(target)) => Ok(Self {
                method: Method::from(method),
                target: target.to_string(),
                version: parts
                    .next()
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            }),
            _ => Err(CodecError::MalformedRequestLine(line.to_string())),
        }
    }

    /// Parse only the first line of a full request text
    pub fn of(text: &str) -> Result<Self, CodecError> {
        let first = text.split('\n').next().unwrap_or("");
        Self::parse(first.trim_end_matches('\r'))
    }
}

/// Split a header line on the first `": "`; the name must not be blank
fn header_parts(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
        .map(|(name, value)| (name.trim(), value))
        .filter(|(name, _)| !name.is_empty())
}

fn parse_query(query: &str) -> QueryParams {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(name), percent_decode(value))
        })
        .collect()
}

fn percent_decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::debug!(raw, error = %e, "Keeping undecodable query component as-is");
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::auth::{
        ApiKeyAuth, AuthSpec, CustomAuth, JwtAuth, NtlmAuth, StaticToken,
    };
    use crate::http::ContentFormat;

    #[test]
    fn test_basic_auth_header() {
        let spec = RequestSpec::builder()
            .url("/login")
            .basic_auth("user", "pass")
            .build();

        let text = encode(&spec).unwrap();
        assert_eq!(
            text,
            "GET /login HTTP/1.1\nAuthorization: Basic dXNlcjpwYXNz\n"
        );
    }

    #[test]
    fn test_decode_query_and_headers() {
        let spec = decode("GET /search?q=a%20b HTTP/1.1\nHost: x\n\n").unwrap();

        assert_eq!(spec.method, Method::Get);
        assert_eq!(spec.url, "/search");
        assert_eq!(spec.query_params.len(), 1);
        assert_eq!(spec.query_params.get("q"), Some(&"a b".to_string()));
        assert_eq!(spec.headers.iter().collect::<Vec<_>>(), vec![("Host", "x")]);
        assert_eq!(spec.content, None);
    }

    #[test]
    fn test_encode_json_body() {
        let spec = RequestSpec::builder()
            .method("post")
            .url("/x")
            .content(ContentFormat::Json, "{}")
            .build();

        assert_eq!(
            encode(&spec).unwrap(),
            "POST /x HTTP/1.1\nContent-Type: application/json\n\n{}"
        );
    }

    #[test]
    fn test_content_type_without_body_has_no_blank_line() {
        let spec = RequestSpec::builder()
            .method("POST")
            .url("/x")
            .content(ContentFormat::Form, "")
            .build();

        assert_eq!(
            encode(&spec).unwrap(),
            "POST /x HTTP/1.1\nContent-Type: application/x-www-form-urlencoded\n"
        );
    }

    #[test]
    fn test_single_token_request_line_is_malformed() {
        assert_eq!(
            decode("GET\nHost: x\n").unwrap_err(),
            CodecError::MalformedRequestLine("GET".to_string())
        );
        assert!(matches!(
            decode(""),
            Err(CodecError::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn test_header_order_with_auth_and_content() {
        let spec = RequestSpec::builder()
            .method("PUT")
            .url("https://api.example.com/items")
            .param("id", "42")
            .param("tag", "a&b")
            .header("Host", "api.example.com")
            .header("Cookie", "a=1")
            .header("Cookie", "b=2")
            .auth(AuthSpec::Ntlm(NtlmAuth::new("CORP", "bob", "pw")))
            .content(ContentFormat::Xml, "<item/>")
            .build();

        let expected = "PUT https://api.example.com/items?id=42&tag=a%26b HTTP/1.1\n\
                        Host: api.example.com\n\
                        Cookie: a=1\n\
                        Cookie: b=2\n\
                        Authorization: NTLM Q09SUFxib2I6cHc=\n\
                        Content-Type: application/xml\n\
                        \n\
                        <item/>";
        assert_eq!(encode(&spec).unwrap(), expected);
    }

    #[test]
    fn test_api_key_and_custom_lines_are_verbatim() {
        let spec = RequestSpec::builder()
            .url("/a")
            .auth(AuthSpec::ApiKey(ApiKeyAuth::new("X-Api-Key: k1")))
            .build();
        assert!(encode(&spec).unwrap().ends_with("\nX-Api-Key: k1\n"));

        let spec = RequestSpec::builder()
            .url("/a")
            .auth(AuthSpec::Custom(CustomAuth::new("X-Token", "t1")))
            .build();
        assert!(encode(&spec).unwrap().ends_with("\nX-Token: t1\n"));
    }

    #[test]
    fn test_jwt_generate_uses_injected_issuer() {
        let spec = RequestSpec::builder()
            .url("/me")
            .auth(AuthSpec::Jwt(JwtAuth::generate()))
            .build();

        let codec = RequestCodec::new().with_issuer(Arc::new(StaticToken::new("stub.jwt.token")));
        assert_eq!(
            codec.encode(&spec).unwrap(),
            "GET /me HTTP/1.1\nAuthorization: Bearer stub.jwt.token\n"
        );

        assert_eq!(
            RequestCodec::new().encode(&spec).unwrap_err(),
            CodecError::MissingTokenIssuer
        );
    }

    #[test]
    fn test_round_trip_is_textually_stable() {
        let spec = RequestSpec::builder()
            .method("post")
            .url("/api/v1/users")
            .param("filter", "name eq 'x'")
            .param("empty", "")
            .header("Host", "example.com")
            .header("X-Trace", "a: b")
            .bearer_auth("tok")
            .content(ContentFormat::Json, "{\n  \"name\": \"test\"\n}")
            .build();

        let text = encode(&spec).unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(encode(&decoded).unwrap(), text);

        assert_eq!(decoded.method, Method::Post);
        assert_eq!(decoded.url, spec.url);
        assert_eq!(decoded.query_params, spec.query_params);
        assert_eq!(decoded.headers.get("X-Trace"), Some("a: b"));
        assert_eq!(decoded.headers.get("Authorization"), Some("Bearer tok"));
        assert_eq!(decoded.headers.get("Content-Type"), Some("application/json"));
        assert_eq!(
            decoded.content,
            Some(ContentSpec::raw("{\n  \"name\": \"test\"\n}"))
        );
    }

    #[test]
    fn test_empty_url_round_trips() {
        let spec = RequestSpec::new("GET", "");
        let text = encode(&spec).unwrap();
        assert_eq!(text, "GET  HTTP/1.1\n");

        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.method, Method::Get);
        assert_eq!(decoded.url, "");
        assert_eq!(encode(&decoded).unwrap(), text);

        let decoded = decode("GET ?a=1 HTTP/1.1\n").unwrap();
        assert_eq!(decoded.url, "");
        assert_eq!(decoded.query_params["a"], "1");
    }

    #[test]
    fn test_empty_method_token_is_kept() {
        let line = RequestLine::parse(" /x HTTP/1.1").unwrap();
        assert_eq!(line.method, Method::Extension(String::new()));
        assert_eq!(line.target, "/x");

        let text = " /x HTTP/1.1\n";
        assert_eq!(encode(&decode(text).unwrap()).unwrap(), text);
    }

    #[test]
    fn test_header_lines_decode_needs_colon_space() {
        assert_eq!(header_parts("X-Api-Key: abc"), Some(("X-Api-Key", "abc")));
        assert_eq!(header_parts("X-Empty: "), Some(("X-Empty", "")));
        assert_eq!(header_parts("X-Api-Key:abc"), None);
        assert_eq!(header_parts(": value"), None);

        let spec = RequestSpec::builder()
            .method("GET")
            .url("/x")
            .auth(AuthSpec::ApiKey(ApiKeyAuth::new("X-Api-Key:abc")))
            .build();
        let text = encode(&spec).unwrap();
        assert_eq!(text, "GET /x HTTP/1.1\nX-Api-Key:abc\n");
        assert!(decode(&text).unwrap().headers.is_empty());

        let spec = RequestSpec::builder()
            .method("GET")
            .url("/x")
            .auth(AuthSpec::Custom(CustomAuth::new("", "v")))
            .build();
        assert!(decode(&encode(&spec).unwrap()).unwrap().headers.is_empty());
    }

    #[test]
    fn test_malformed_header_lines_are_dropped() {
        let text = "GET / HTTP/1.1\nHost: x\ngarbage\n: no-name\nAccept:text/html\nX-Ok: 1\n";
        let spec = decode(text).unwrap();
        assert_eq!(
            spec.headers.iter().collect::<Vec<_>>(),
            vec![("Host", "x"), ("X-Ok", "1")]
        );
    }

    #[test]
    fn test_crlf_text_and_body_trimming() {
        let text = "post /form HTTP/1.1\r\nHost: x\r\n\r\n\r\n  a=1&b=2  \r\n";
        let spec = decode(text).unwrap();
        assert_eq!(spec.method, Method::Post);
        assert_eq!(spec.headers.get("host"), Some("x"));
        assert_eq!(spec.content, Some(ContentSpec::raw("a=1&b=2")));
    }

    #[test]
    fn test_query_edge_cases() {
        let spec = decode("GET /p?flag&x=1=2&&bad=%E0%A4%A&y=%2B HTTP/1.1\n").unwrap();
        let pairs: Vec<(&str, &str)> = spec
            .query_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("flag", ""), ("x", "1=2"), ("bad", "%E0%A4%A"), ("y", "+")]
        );
    }

    #[test]
    fn test_request_line_version() {
        let line = RequestLine::of("DELETE /a?b=c HTTP/2\nHost: x").unwrap();
        assert_eq!(line.method, Method::Delete);
        assert_eq!(line.target, "/a?b=c");
        assert_eq!(line.version.as_deref(), Some("HTTP/2"));

        let line = RequestLine::parse("GET /").unwrap();
        assert_eq!(line.version, None);
    }

    #[test]
    fn test_configured_http_version() {
        let config = CodecConfig {
            http_version: "HTTP/1.0".to_string(),
        };
        let codec = RequestCodec::from_config(&config);
        let text = codec.encode(&RequestSpec::new("get", "/")).unwrap();
        assert_eq!(text, "GET / HTTP/1.0\n");
    }
}
