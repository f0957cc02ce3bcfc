//! Response match/hide rules
//!
//! A [`MatchRuleSet`] tells the fuzzing engine which captured responses to
//! keep (`match`) or suppress (`hide`). Rules are declarative: each carries a
//! [`Criterion`] and a payload whose shape is fixed by that criterion. The
//! engine owns evaluation, including how rules combine and whether bounds
//! are sane.

mod builder;
mod criterion;
mod form;

pub use builder::{MatchRuleBuilder, RuleInput};
pub use criterion::{Criterion, LengthUnit, SensitivePattern};
pub use form::{RuleDocument, RuleFields};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RuleFormError;

/// Whether matching responses are kept or suppressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Match,
    Hide,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Match => "match",
            MatchMode::Hide => "hide",
        }
    }
}

impl FromStr for MatchMode {
    type Err = RuleFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "match" => Ok(MatchMode::Match),
            "hide" => Ok(MatchMode::Hide),
            _ => Err(RuleFormError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric-as-text bounds; an empty string means unbounded on that side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: String,
    pub max: String,
}

impl Bounds {
    pub fn new(min: &str, max: &str) -> Self {
        Self {
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Lower bound, `None` when blank
    pub fn lower(&self) -> Option<&str> {
        Some(self.min.trim()).filter(|v| !v.is_empty())
    }

    /// Upper bound, `None` when blank
    pub fn upper(&self) -> Option<&str> {
        Some(self.max.trim()).filter(|v| !v.is_empty())
    }
}

/// Criterion-specific rule payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RulePayload {
    /// Status code tokens, kept as text so the engine can read ranges or wildcards
    Codes { codes: Vec<String> },
    Value { value: String },
    /// Exactly one key/value pair per rule
    Headers { headers: IndexMap<String, String> },
    Patterns { patterns: Vec<SensitivePattern> },
    Bounds(Bounds),
}

impl RulePayload {
    /// Whether this payload shape belongs to `criterion`
    pub fn fits(&self, criterion: Criterion) -> bool {
        matches!(
            (criterion, self),
            (Criterion::StatusCode, RulePayload::Codes { .. })
                | (Criterion::ResponseHeader, RulePayload::Headers { .. })
                | (Criterion::ResponseBodyContains, RulePayload::Value { .. })
                | (Criterion::ElapsedTime, RulePayload::Bounds(_))
                | (Criterion::ResponseLength(_), RulePayload::Bounds(_))
                | (Criterion::SensitiveInfo, RulePayload::Patterns { .. })
        )
    }

    /// Conditions object in the engine's key vocabulary
    fn engine_conditions(&self) -> serde_json::Value {
        match self {
            RulePayload::Codes { codes } => serde_json::json!({ "code": codes }),
            RulePayload::Value { value } => serde_json::json!({ "value": value }),
            RulePayload::Headers { headers } => serde_json::json!({ "headers": headers }),
            RulePayload::Patterns { patterns } => serde_json::json!({
                "info": patterns.iter().map(SensitivePattern::name).collect::<Vec<_>>(),
            }),
            RulePayload::Bounds(bounds) => {
                serde_json::json!({ "min": bounds.min, "max": bounds.max })
            }
        }
    }
}

/// One match/hide predicate. Construct through [`MatchRuleBuilder`]; the
/// payload always fits the criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct MatchRule {
    criterion: Criterion,
    payload: RulePayload,
}

#[derive(Deserialize)]
struct RawRule {
    criterion: Criterion,
    payload: RulePayload,
}

impl TryFrom<RawRule> for MatchRule {
    type Error = RuleFormError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        if !raw.payload.fits(raw.criterion) {
            return Err(RuleFormError::PayloadMismatch(raw.criterion.tag()));
        }
        Ok(MatchRule {
            criterion: raw.criterion,
            payload: raw.payload,
        })
    }
}

impl MatchRule {
    pub(crate) fn new(criterion: Criterion, payload: RulePayload) -> Self {
        debug_assert!(payload.fits(criterion));
        Self { criterion, payload }
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn payload(&self) -> &RulePayload {
        &self.payload
    }
}

/// Ordered rules plus the mode they are applied in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRuleSet {
    mode: MatchMode,
    rules: Vec<MatchRule>,
}

impl MatchRuleSet {
    pub fn new(mode: MatchMode, rules: Vec<MatchRule>) -> Self {
        Self { mode, rules }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The engine's `match_hide` value: `[mode, [{option: conditions}, ...]]`.
    ///
    /// Each rule gets its own object so repeated criteria survive.
    pub fn to_match_hide(&self) -> serde_json::Value {
        let rules: Vec<serde_json::Value> = self
            .rules
            .iter()
            .map(|rule| {
                let mut entry = serde_json::Map::new();
                entry.insert(
                    rule.criterion.engine_option(),
                    rule.payload.engine_conditions(),
                );
                serde_json::Value::Object(entry)
            })
            .collect();

        serde_json::json!([self.mode.as_str(), rules])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_blank_is_unbounded() {
        let bounds = Bounds::new("", " 500 ");
        assert_eq!(bounds.lower(), None);
        assert_eq!(bounds.upper(), Some("500"));
    }

    #[test]
    fn test_rule_serializes_with_criterion_tag() {
        let rule = MatchRuleBuilder::response_length(LengthUnit::Bytes, "", "500");
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "criterion": "response_length-bytes",
                "payload": {"min": "", "max": "500"},
            })
        );

        let back: MatchRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_mismatched_payload_is_rejected() {
        let json = serde_json::json!({
            "criterion": "status_code",
            "payload": {"value": "oops"},
        });
        assert!(serde_json::from_value::<MatchRule>(json).is_err());
    }

    #[test]
    fn test_match_hide_shape_keeps_duplicates() {
        let set = MatchRuleBuilder::new(MatchMode::Hide)
            .push(RuleInput::StatusCode {
                codes: "404".to_string(),
            })
            .push(RuleInput::StatusCode {
                codes: "500,502".to_string(),
            })
            .push(RuleInput::SensitiveInfo {
                pattern: SensitivePattern::EmailAddresses,
            })
            .build();

        assert_eq!(
            set.to_match_hide(),
            serde_json::json!([
                "hide",
                [
                    {"response-code": {"code": ["404"]}},
                    {"response-code": {"code": ["500", "502"]}},
                    {"sensitive-info": {"info": ["Email Addresses"]}},
                ]
            ])
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("HIDE".parse::<MatchMode>().unwrap(), MatchMode::Hide);
        assert!("drop".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::default(), MatchMode::Match);
    }
}
