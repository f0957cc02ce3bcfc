//! apifuzz - request modeling core of an API fuzzer
//!
//! Two independent, side-effect-free pieces feed the remote fuzzing engine:
//!
//! - [`http`]: a bidirectional codec between structured [`RequestSpec`]s and
//!   raw HTTP/1.1 request text, including authentication header encoding.
//! - [`rules`]: the declarative match/hide rule model the engine uses to
//!   keep or discard captured responses.

pub mod config;
pub mod error;
pub mod http;
pub mod rules;

pub use config::Config;
pub use error::*;
pub use http::{decode, encode, AuthSpec, RequestCodec, RequestSpec, TokenIssuer};
pub use rules::{Criterion, MatchMode, MatchRule, MatchRuleBuilder, MatchRuleSet, RuleInput};
