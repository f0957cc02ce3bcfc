//! Loose request forms
//!
//! The control panel submits requests as JSON with free-text tags
//! (`{"type": "apiKey", ...}`, `{"action": "use-jwt", ...}`). This module maps
//! that shape onto the closed [`RequestSpec`] model; it is the only place an
//! unknown authentication tag can appear.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

use super::auth::{
    ApiKeyAuth, AuthSpec, BasicAuth, BearerAuth, CustomAuth, DigestAuth, JwtAuth, JwtMode,
    NtlmAuth,
};
use super::request::{ContentFormat, ContentSpec, Headers, Method, RequestSpec};
use crate::error::CodecError;

/// Request as submitted by the control panel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestForm {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "queryParams", alias = "query_params")]
    pub params: IndexMap<String, String>,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub auth: Option<AuthForm>,
    #[serde(default)]
    pub content: Option<ContentForm>,
}

/// Authentication block with a free-text `type` tag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthForm {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentForm {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub body: String,
}

impl RequestForm {
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        serde_json::from_str(json).map_err(|e| CodecError::InvalidForm(e.to_string()))
    }

    pub fn into_spec(self) -> Result<RequestSpec, CodecError> {
        RequestSpec::try_from(self)
    }
}

impl TryFrom<RequestForm> for RequestSpec {
    type Error = CodecError;

    fn try_from(form: RequestForm) -> Result<Self, Self::Error> {
        if form.method.trim().is_empty() {
            return Err(CodecError::InvalidForm("missing method".to_string()));
        }
        if form.url.trim().is_empty() {
            return Err(CodecError::InvalidForm("missing url".to_string()));
        }

        let auth = form.auth.map(AuthSpec::try_from).transpose()?;
        let content = form.content.and_then(ContentForm::into_content);

        Ok(RequestSpec {
            method: Method::from(form.method.trim()),
            url: form.url,
            query_params: form.params,
            headers: form.headers,
            auth,
            content,
        })
    }
}

impl ContentForm {
    /// A blank format leaves the body undeclared; unknown names become text
    fn into_content(self) -> Option<ContentSpec> {
        let format = self.format.trim();
        if format.is_empty() {
            return (!self.body.is_empty()).then(|| ContentSpec::raw(self.body));
        }
        Some(ContentSpec::new(ContentFormat::from(format), self.body))
    }
}

impl AuthForm {
    /// String value of a field; missing fields read as empty
    fn field(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// First non-empty field among `names`
    fn first_field(&self, names: &[&str]) -> String {
        names
            .iter()
            .map(|name| self.field(name))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}

impl TryFrom<AuthForm> for AuthSpec {
    type Error = CodecError;

    fn try_from(form: AuthForm) -> Result<Self, Self::Error> {
        let auth = match form.kind.as_str() {
            "" | "none" => AuthSpec::None,
            "basic" => AuthSpec::Basic(BasicAuth::new(
                &form.field("username"),
                &form.field("password"),
            )),
            "bearer" => AuthSpec::Bearer(BearerAuth::new(&form.field("token"))),
            "digest" => AuthSpec::Digest(DigestAuth::new(
                &form.field("username"),
                &form.field("password"),
            )),
            "apiKey" | "api_key" | "apikey" => {
                AuthSpec::ApiKey(ApiKeyAuth::new(&form.first_field(&["key", "key_header_line"])))
            }
            "jwt" => {
                let mode = match form.first_field(&["action", "mode"]).as_str() {
                    "generate-jwt" | "generate" => JwtMode::Generate,
                    "use-jwt" | "use" | "" => JwtMode::Use,
                    other => {
                        return Err(CodecError::UnsupportedAuthVariant(format!("jwt/{}", other)))
                    }
                };
                let token = Some(form.first_field(&["token_info", "token"]))
                    .filter(|t| !t.is_empty() && mode == JwtMode::Use);
                AuthSpec::Jwt(JwtAuth { mode, token })
            }
            "ntlm" => AuthSpec::Ntlm(NtlmAuth::new(
                &form.field("domain"),
                &form.field("username"),
                &form.field("password"),
            )),
            "custom" => AuthSpec::Custom(CustomAuth::new(
                &form.field("header_key"),
                &form.field("header_value"),
            )),
            other => return Err(CodecError::UnsupportedAuthVariant(other.to_string())),
        };
        Ok(auth)
    }
}
