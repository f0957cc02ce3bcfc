//! Rule construction from raw form values
//!
//! The builder never fails. Blank fields stay blank in the payload and
//! semantic checks such as `min <= max` are left to the engine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    Bounds, Criterion, LengthUnit, MatchMode, MatchRule, MatchRuleSet, RulePayload,
    SensitivePattern,
};

/// Raw values for one rule, as typed into the control panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "criterion", rename_all = "snake_case")]
pub enum RuleInput {
    StatusCode {
        #[serde(default)]
        codes: String,
    },
    ResponseHeader {
        #[serde(default)]
        key: String,
        #[serde(default)]
        value: String,
    },
    ResponseBodyContains {
        #[serde(default)]
        value: String,
    },
    ElapsedTime {
        #[serde(default)]
        min: String,
        #[serde(default)]
        max: String,
    },
    ResponseLength {
        #[serde(default)]
        unit: LengthUnit,
        #[serde(default)]
        min: String,
        #[serde(default)]
        max: String,
    },
    /// The catalogue has no blank entry, so unlike the other fields the
    /// pattern cannot default and must be named.
    SensitiveInfo { pattern: SensitivePattern },
}

/// Collects rules in input order for one [`MatchRuleSet`]
#[derive(Debug, Clone, Default)]
pub struct MatchRuleBuilder {
    mode: MatchMode,
    rules: Vec<MatchRule>,
}

impl MatchRuleBuilder {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            rules: Vec::new(),
        }
    }

    /// Build a whole set from ordered inputs, one rule per entry
    pub fn from_inputs<I>(mode: MatchMode, inputs: I) -> MatchRuleSet
    where
        I: IntoIterator<Item = RuleInput>,
    {
        inputs
            .into_iter()
            .fold(Self::new(mode), |builder, input| builder.push(input))
            .build()
    }

    /// Append the rule for `input`
    pub fn push(mut self, input: RuleInput) -> Self {
        self.rules.push(Self::rule(&input));
        self
    }

    /// Append an already-built rule
    pub fn push_rule(mut self, rule: MatchRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> MatchRuleSet {
        tracing::debug!(mode = %self.mode, rules = self.rules.len(), "Built match rule set");
        MatchRuleSet::new(self.mode, self.rules)
    }

    /// Shape one input into its rule
    pub fn rule(input: &RuleInput) -> MatchRule {
        match input {
            RuleInput::StatusCode { codes } => Self::status_code(codes),
            RuleInput::ResponseHeader { key, value } => Self::response_header(key, value),
            RuleInput::ResponseBodyContains { value } => Self::response_body_contains(value),
            RuleInput::ElapsedTime { min, max } => Self::elapsed_time(min, max),
            RuleInput::ResponseLength { unit, min, max } => Self::response_length(*unit, min, max),
            RuleInput::SensitiveInfo { pattern } => Self::sensitive_info(*pattern),
        }
    }

    /// Comma-separated codes, each token kept exactly as typed
    pub fn status_code(raw: &str) -> MatchRule {
        let codes = raw.split(',').map(str::to_string).collect();
        MatchRule::new(Criterion::StatusCode, RulePayload::Codes { codes })
    }

    pub fn response_length(unit: LengthUnit, min: &str, max: &str) -> MatchRule {
        MatchRule::new(
            Criterion::ResponseLength(unit),
            RulePayload::Bounds(Bounds::new(min, max)),
        )
    }

    /// Bounds in milliseconds
    pub fn elapsed_time(min: &str, max: &str) -> MatchRule {
        MatchRule::new(
            Criterion::ElapsedTime,
            RulePayload::Bounds(Bounds::new(min, max)),
        )
    }

    pub fn response_body_contains(value: &str) -> MatchRule {
        MatchRule::new(
            Criterion::ResponseBodyContains,
            RulePayload::Value {
                value: value.to_string(),
            },
        )
    }

    /// One header per rule; several headers need several rules
    pub fn response_header(key: &str, value: &str) -> MatchRule {
        let mut headers = IndexMap::new();
        headers.insert(key.to_string(), value.to_string());
        MatchRule::new(Criterion::ResponseHeader, RulePayload::Headers { headers })
    }

    pub fn sensitive_info(pattern: SensitivePattern) -> MatchRule {
        MatchRule::new(
            Criterion::SensitiveInfo,
            RulePayload::Patterns {
                patterns: vec![pattern],
            },
        )
    }
}
