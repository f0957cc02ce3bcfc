//! Rule forms and rule documents
//!
//! Maps the control panel's select values onto [`RuleInput`]s. Unlike the
//! builder this layer can fail, because the free-text kind, unit and
//! pattern names have to land in closed sets.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{LengthUnit, MatchMode, MatchRuleBuilder, MatchRuleSet, RuleInput};
use crate::error::RuleFormError;

/// Raw field values of one form group, keyed by field name
pub type RuleFields = IndexMap<String, String>;

fn field(fields: &RuleFields, name: &str) -> String {
    fields.get(name).cloned().unwrap_or_default()
}

impl RuleInput {
    /// Map a form group onto a typed input.
    ///
    /// `kind` accepts both the panel's select values (`response-code`,
    /// `length-in`, ...) and criterion tags (`status_code`,
    /// `response_length-bytes`, ...).
    pub fn from_form(kind: &str, fields: &RuleFields) -> Result<Self, RuleFormError> {
        let input = match kind.trim() {
            "response-code" | "status_code" => RuleInput::StatusCode {
                codes: field(fields, "codes"),
            },
            "response-header" | "response_header" => RuleInput::ResponseHeader {
                key: field(fields, "key"),
                value: field(fields, "value"),
            },
            "response-value" | "response_body_contains" => RuleInput::ResponseBodyContains {
                value: field(fields, "value"),
            },
            "elapsed-time" | "elapsed_time" => RuleInput::ElapsedTime {
                min: field(fields, "min"),
                max: field(fields, "max"),
            },
            "length-in" | "response_length" => RuleInput::ResponseLength {
                unit: field(fields, "unit").parse()?,
                min: field(fields, "min"),
                max: field(fields, "max"),
            },
            "sensitive-info" | "sensitive_info" => RuleInput::SensitiveInfo {
                pattern: field(fields, "pattern").parse()?,
            },
            other => {
                let unit = other
                    .strip_prefix("length-in-")
                    .or_else(|| other.strip_prefix("response_length-"))
                    .ok_or_else(|| RuleFormError::UnknownCriterion(other.to_string()))?;
                RuleInput::ResponseLength {
                    unit: unit.parse::<LengthUnit>()?,
                    min: field(fields, "min"),
                    max: field(fields, "max"),
                }
            }
        };
        Ok(input)
    }
}

/// A rule file: optional mode plus ordered inputs
///
/// ```toml
/// mode = "hide"
///
/// [[rules]]
/// criterion = "status_code"
/// codes = "404,500"
///
/// [[rules]]
/// criterion = "response_length"
/// unit = "words"
/// max = "20"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<MatchMode>,
    #[serde(default)]
    pub rules: Vec<RuleInput>,
}

impl RuleDocument {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse rule document")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse rule document")
    }

    /// Build the set, using `default_mode` when the document names none
    pub fn into_rule_set(self, default_mode: MatchMode) -> MatchRuleSet {
        MatchRuleBuilder::from_inputs(self.mode.unwrap_or(default_mode), self.rules)
    }
}
