//! Fuzzy-logic policy inference.
//!
//! Converts a classification result plus the message length into a crisp
//! policy decision (allowed / flagged / blocked) with auditable
//! per-action scores.

mod engine;
mod membership;
mod rules;

pub use engine::{ActionScores, Decision, DecisionEngine, RuleActivation, ACCEPT_THRESHOLD};
pub use membership::Triangle;
pub use rules::{Action, Condition, FuzzyInput, Level, MembershipCatalog, Rule, RuleSet, Variable};
