//! Property-based tests for the request text codec.
//!
//! Generated requests are restricted to what the text form can carry: URLs
//! without `?`, header names without separators and bodies without
//! surrounding whitespace.

use apifuzz::http::auth::{
    ApiKeyAuth, BasicAuth, BearerAuth, CustomAuth, DigestAuth, JwtAuth, NtlmAuth,
};
use apifuzz::http::{
    AuthSpec, ContentFormat, ContentSpec, Headers, Method, QueryParams, RequestSpec,
};
use apifuzz::{decode, encode};
use proptest::prelude::*;

// Strategies

fn arb_method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just("GET"),
        Just("POST"),
        Just("PUT"),
        Just("DELETE"),
        Just("PATCH"),
        Just("HEAD"),
        Just("OPTIONS"),
    ]
    .prop_map(Method::from)
}

fn arb_url() -> impl Strategy<Value = String> {
    prop_oneof![
        "/[a-z0-9/]{0,12}",
        "https://api\\.example\\.com/[a-z0-9/]{0,12}",
    ]
}

/// Names and values may include characters that need percent-encoding.
fn arb_query() -> impl Strategy<Value = QueryParams> {
    prop::collection::vec(("[a-z_]{1,6}", "[a-zA-Z0-9 &=/+%]{0,8}"), 0..4)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn arb_headers() -> impl Strategy<Value = Headers> {
    prop::collection::vec((arb_header_name(), "[!-~][ -~]{0,12}"), 0..5)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn arb_header_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{0,10}"
}

/// Credentials may hold any printable character; they are base64-encoded.
fn arb_credential() -> impl Strategy<Value = String> {
    "[ -~]{0,12}"
}

/// Every scheme that needs no token issuer.
fn arb_auth() -> impl Strategy<Value = Option<AuthSpec>> {
    prop_oneof![
        Just(None),
        Just(Some(AuthSpec::None)),
        (arb_credential(), arb_credential())
            .prop_map(|(user, pass)| Some(AuthSpec::Basic(BasicAuth::new(&user, &pass)))),
        "[!-~]{0,20}".prop_map(|token| Some(AuthSpec::Bearer(BearerAuth::new(&token)))),
        (arb_credential(), arb_credential())
            .prop_map(|(user, pass)| Some(AuthSpec::Digest(DigestAuth::new(&user, &pass)))),
        (arb_header_name(), "[!-~][ -~]{0,12}").prop_map(|(name, value)| {
            Some(AuthSpec::ApiKey(ApiKeyAuth::new(&format!("{}: {}", name, value))))
        }),
        "[!-~]{1,20}".prop_map(|token| Some(AuthSpec::Jwt(JwtAuth::with_token(&token)))),
        (arb_credential(), arb_credential(), arb_credential()).prop_map(
            |(domain, user, pass)| Some(AuthSpec::Ntlm(NtlmAuth::new(&domain, &user, &pass)))
        ),
        (arb_header_name(), "[!-~][ -~]{0,12}")
            .prop_map(|(key, value)| Some(AuthSpec::Custom(CustomAuth::new(&key, &value)))),
    ]
}

fn arb_body() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[!-~]",
        "[!-~][ -~\n]{0,30}[!-~]",
    ]
}

fn arb_format() -> impl Strategy<Value = Option<ContentFormat>> {
    prop_oneof![
        Just(None),
        Just(Some(ContentFormat::Json)),
        Just(Some(ContentFormat::Xml)),
        Just(Some(ContentFormat::Text)),
        Just(Some(ContentFormat::Form)),
    ]
}

fn arb_request(
    format: impl Strategy<Value = Option<ContentFormat>>,
) -> impl Strategy<Value = RequestSpec> {
    (
        arb_method(),
        arb_url(),
        arb_query(),
        arb_headers(),
        arb_auth(),
        format,
        arb_body(),
    )
        .prop_map(
            |(method, url, query_params, headers, auth, format, body)| RequestSpec {
                method,
                url,
                query_params,
                headers,
                auth,
                content: Some(ContentSpec { format, body }),
            },
        )
}

// Properties

proptest! {
    /// Encoding a decoded request reproduces the text it was decoded from.
    #[test]
    fn encoded_text_is_a_fixed_point(spec in arb_request(arb_format())) {
        let text = encode(&spec).unwrap();
        let decoded = decode(&text).unwrap();
        prop_assert_eq!(encode(&decoded).unwrap(), text);
    }

    /// Without a declared format only the auth line is synthesized; it comes
    /// back as the last header and every other field survives.
    #[test]
    fn decode_preserves_fields(spec in arb_request(Just(None))) {
        let decoded = decode(&encode(&spec).unwrap()).unwrap();

        prop_assert_eq!(&decoded.method, &spec.method);
        prop_assert_eq!(&decoded.url, &spec.url);
        prop_assert_eq!(&decoded.query_params, &spec.query_params);
        prop_assert!(decoded.auth.is_none());

        let mut expected: Vec<(String, String)> = spec
            .headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let auth_line = spec
            .auth
            .as_ref()
            .map(|auth| auth.header_line(None).unwrap())
            .unwrap_or_default();
        if let Some(line) = auth_line {
            let (name, value) = line.split_once(": ").unwrap();
            expected.push((name.to_string(), value.to_string()));
        }
        let actual: Vec<(String, String)> = decoded
            .headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        prop_assert_eq!(actual, expected);

        let body = spec.content.as_ref().map(|c| c.body.as_str()).unwrap_or("");
        let decoded_body = decoded.content.as_ref().map(|c| c.body.as_str()).unwrap_or("");
        prop_assert_eq!(decoded_body, body);
    }

    /// Decoding never panics on arbitrary text.
    #[test]
    fn decode_total_on_arbitrary_text(text in "[ -~\r\n]{0,80}") {
        let _ = decode(&text);
    }
}
