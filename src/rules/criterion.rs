//! Match criteria and the sensitive information catalogue

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RuleFormError;

/// Unit a response length bound is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Bytes,
    Lines,
    Words,
    Chars,
}

impl LengthUnit {
    pub fn all() -> &'static [LengthUnit] {
        &[
            LengthUnit::Bytes,
            LengthUnit::Lines,
            LengthUnit::Words,
            LengthUnit::Chars,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Bytes => "bytes",
            LengthUnit::Lines => "lines",
            LengthUnit::Words => "words",
            LengthUnit::Chars => "chars",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = RuleFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LengthUnit::all()
            .iter()
            .copied()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RuleFormError::UnknownLengthUnit(s.to_string()))
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed catalogue of sensitive information the engine can detect.
///
/// Only the names are shared; detection lives in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensitivePattern {
    #[serde(rename = "Credit card numbers")]
    CreditCardNumbers,
    #[serde(rename = "16 digits credit card numbers")]
    CreditCard16Digits,
    #[serde(rename = "Social Security Numbers")]
    SocialSecurityNumbers,
    #[serde(rename = "Email Addresses")]
    EmailAddresses,
    #[serde(rename = "International phone numbers")]
    InternationalPhoneNumbers,
    #[serde(rename = "Common password patterns")]
    CommonPasswordPatterns,
    #[serde(rename = "API Keys")]
    ApiKeys,
    #[serde(rename = "Date of birth")]
    DateOfBirth,
}

impl SensitivePattern {
    pub fn all() -> &'static [SensitivePattern] {
        &[
            SensitivePattern::CreditCardNumbers,
            SensitivePattern::CreditCard16Digits,
            SensitivePattern::SocialSecurityNumbers,
            SensitivePattern::EmailAddresses,
            SensitivePattern::InternationalPhoneNumbers,
            SensitivePattern::CommonPasswordPatterns,
            SensitivePattern::ApiKeys,
            SensitivePattern::DateOfBirth,
        ]
    }

    /// Catalogue name shared with the engine
    pub fn name(&self) -> &'static str {
        match self {
            SensitivePattern::CreditCardNumbers => "Credit card numbers",
            SensitivePattern::CreditCard16Digits => "16 digits credit card numbers",
            SensitivePattern::SocialSecurityNumbers => "Social Security Numbers",
            SensitivePattern::EmailAddresses => "Email Addresses",
            SensitivePattern::InternationalPhoneNumbers => "International phone numbers",
            SensitivePattern::CommonPasswordPatterns => "Common password patterns",
            SensitivePattern::ApiKeys => "API Keys",
            SensitivePattern::DateOfBirth => "Date of birth",
        }
    }
}

impl FromStr for SensitivePattern {
    type Err = RuleFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensitivePattern::all()
            .iter()
            .copied()
            .find(|pattern| pattern.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RuleFormError::UnknownPattern(s.to_string()))
    }
}

impl fmt::Display for SensitivePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a rule inspects in a captured response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Criterion {
    StatusCode,
    ResponseHeader,
    ResponseBodyContains,
    /// Milliseconds, by engine convention
    ElapsedTime,
    ResponseLength(LengthUnit),
    SensitiveInfo,
}

impl Criterion {
    /// Tag with the length unit folded in, e.g. `response_length-bytes`
    pub fn tag(&self) -> String {
        match self {
            Criterion::StatusCode => "status_code".to_string(),
            Criterion::ResponseHeader => "response_header".to_string(),
            Criterion::ResponseBodyContains => "response_body_contains".to_string(),
            Criterion::ElapsedTime => "elapsed_time".to_string(),
            Criterion::ResponseLength(unit) => format!("response_length-{}", unit),
            Criterion::SensitiveInfo => "sensitive_info".to_string(),
        }
    }

    /// Name of the engine's analyser option for this criterion
    pub fn engine_option(&self) -> String {
        match self {
            Criterion::StatusCode => "response-code".to_string(),
            Criterion::ResponseHeader => "response-header".to_string(),
            Criterion::ResponseBodyContains => "value-in-response".to_string(),
            Criterion::ElapsedTime => "response-elapsed-time".to_string(),
            Criterion::ResponseLength(unit) => format!("length-in-{}", unit),
            Criterion::SensitiveInfo => "sensitive-info".to_string(),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Criterion {
    type Err = RuleFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let criterion = match s {
            "status_code" => Criterion::StatusCode,
            "response_header" => Criterion::ResponseHeader,
            "response_body_contains" => Criterion::ResponseBodyContains,
            "elapsed_time" => Criterion::ElapsedTime,
            "sensitive_info" => Criterion::SensitiveInfo,
            other => match other.strip_prefix("response_length-") {
                Some(unit) => Criterion::ResponseLength(unit.parse()?),
                None => return Err(RuleFormError::UnknownCriterion(other.to_string())),
            },
        };
        Ok(criterion)
    }
}

impl TryFrom<String> for Criterion {
    type Error = RuleFormError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Criterion> for String {
    fn from(criterion: Criterion) -> Self {
        criterion.tag()
    }
}
