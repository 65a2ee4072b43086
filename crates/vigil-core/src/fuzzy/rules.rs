//! Fuzzy rules as data.
//!
//! A rule predicate is a small expression tree over (variable, linguistic
//! level) references, combined with fuzzy AND (minimum) and OR (maximum)
//! and evaluated by an interpreter. Rules carry no code, so the rule set
//! is serializable and unit-testable in isolation.

use serde::{Deserialize, Serialize};

use super::membership::Triangle;

/// Numeric inputs a rule may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// Toxicity probability from the classifier, `[0, 1]`.
    Toxicity,
    /// Spam probability from the classifier, `[0, 1]`.
    Spam,
    /// Classifier confidence, `[0, 1]`.
    Confidence,
    /// Message length in characters.
    Length,
}

/// Linguistic levels a variable can be tested against.
///
/// For [`Variable::Length`], `Low`/`Medium`/`High` read as
/// short/medium/long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Lower band (left shoulder).
    Low,
    /// Middle band.
    Medium,
    /// Upper band (right shoulder).
    High,
}

/// The crisp input tuple one decision is made over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyInput {
    /// Toxicity probability.
    pub toxicity: f64,
    /// Spam probability.
    pub spam: f64,
    /// Classifier confidence.
    pub confidence: f64,
    /// Message length in characters.
    pub length: f64,
}

impl FuzzyInput {
    fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Toxicity => self.toxicity,
            Variable::Spam => self.spam,
            Variable::Confidence => self.confidence,
            Variable::Length => self.length,
        }
    }
}

/// A rule predicate: membership tests combined with AND/OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Membership of a variable in a linguistic level.
    Is {
        /// The referenced input.
        variable: Variable,
        /// The referenced linguistic level.
        level: Level,
    },
    /// Fuzzy AND: minimum of both sides.
    And(Box<Condition>, Box<Condition>),
    /// Fuzzy OR: maximum of both sides.
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Shorthand for a membership test.
    pub fn is(variable: Variable, level: Level) -> Self {
        Condition::Is { variable, level }
    }

    /// Combines this condition with another via fuzzy AND.
    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    /// Combines this condition with another via fuzzy OR.
    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    /// Evaluates the predicate to an activation degree in `[0, 1]`.
    pub fn evaluate(&self, input: &FuzzyInput, catalog: &MembershipCatalog) -> f64 {
        match self {
            Condition::Is { variable, level } => catalog
                .triangle(*variable, *level)
                .membership(catalog.fold(*variable, input.get(*variable))),
            Condition::And(left, right) => left
                .evaluate(input, catalog)
                .min(right.evaluate(input, catalog)),
            Condition::Or(left, right) => left
                .evaluate(input, catalog)
                .max(right.evaluate(input, catalog)),
        }
    }
}

/// Policy actions a rule can vote for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Deliver the message normally.
    #[default]
    Allowed,
    /// Deliver but mark for review.
    Flagged,
    /// Withhold the message.
    Blocked,
}

impl Action {
    /// Returns all actions.
    pub fn all() -> &'static [Action] {
        &[Action::Allowed, Action::Flagged, Action::Blocked]
    }

    /// Returns a human-readable name for this action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Allowed => "Allowed",
            Action::Flagged => "Flagged",
            Action::Blocked => "Blocked",
        }
    }
}

/// One IF-THEN rule: predicate, target action, weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier, reported in decision audits.
    pub id: String,
    /// The fuzzified predicate.
    pub condition: Condition,
    /// The action this rule votes for.
    pub action: Action,
    /// Vote weight in `(0, 1]`.
    pub weight: f64,
}

impl Rule {
    /// Creates a rule, clamping the weight into `(0, 1]`.
    pub fn new(id: impl Into<String>, condition: Condition, action: Action, weight: f64) -> Self {
        Self {
            id: id.into(),
            condition,
            action,
            weight: weight.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }
}

/// The fixed, ordered rule collection loaded at startup.
///
/// Ordering carries no semantic weight (aggregation is commutative);
/// only rule content matters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// The rules, in declaration order.
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The default moderation rules.
    ///
    /// The blocked antecedents are aggregated with OR into a single rule:
    /// with the pool mean taken over every rule assigned to an action, a
    /// second blocked rule waking up at a small activation would drag the
    /// mean down while the max stayed put, and the blocked score would dip
    /// exactly as toxicity crossed into its HIGH band. One rule keeps the
    /// blocked score `max` over both antecedents, non-decreasing in
    /// toxicity. The antecedents also reference toxicity only through the
    /// HIGH shoulder.
    pub fn moderation_defaults() -> Self {
        use Level::*;
        use Variable::*;
        let rules = vec![
            Rule::new(
                "toxic_or_confident_spam_block",
                Condition::is(Toxicity, High)
                    .or(Condition::is(Spam, High).and(Condition::is(Confidence, High))),
                Action::Blocked,
                1.0,
            ),
            Rule::new(
                "spam_medium_confident_flag",
                Condition::is(Spam, Medium).and(Condition::is(Confidence, High)),
                Action::Flagged,
                0.7,
            ),
            Rule::new(
                "low_confidence_flag",
                Condition::is(Confidence, Low),
                Action::Flagged,
                0.6,
            ),
            Rule::new(
                "clean_allow",
                Condition::is(Spam, Low).and(Condition::is(Toxicity, Low)),
                Action::Allowed,
                0.8,
            ),
            Rule::new(
                "toxic_medium_confident_flag",
                Condition::is(Toxicity, Medium).and(Condition::is(Confidence, High)),
                Action::Flagged,
                0.75,
            ),
            Rule::new(
                "long_spam_flag",
                Condition::is(Spam, Medium).and(Condition::is(Length, High)),
                Action::Flagged,
                0.6,
            ),
        ];
        Self { rules }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Length values are folded into `[0, LENGTH_CAP]` before membership
/// evaluation so the long band acts as a right shoulder.
const LENGTH_CAP: f64 = 2000.0;

/// Total mapping from (variable, level) to a membership triangle.
///
/// Injectable: tests and embedders can swap bands without touching the
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipCatalog {
    /// Bands for classifier confidence.
    pub confidence: [Triangle; 3],
    /// Bands for spam probability.
    pub spam: [Triangle; 3],
    /// Bands for toxicity probability.
    pub toxicity: [Triangle; 3],
    /// Bands for message length (characters, capped).
    pub length: [Triangle; 3],
}

impl Default for MembershipCatalog {
    fn default() -> Self {
        Self {
            confidence: [
                Triangle::new(0.0, 0.0, 0.5),
                Triangle::new(0.3, 0.5, 0.7),
                Triangle::new(0.5, 1.0, 1.0),
            ],
            spam: [
                Triangle::new(0.0, 0.0, 0.4),
                Triangle::new(0.2, 0.5, 0.8),
                Triangle::new(0.6, 1.0, 1.0),
            ],
            toxicity: [
                Triangle::new(0.0, 0.0, 0.3),
                Triangle::new(0.2, 0.5, 0.8),
                Triangle::new(0.7, 1.0, 1.0),
            ],
            length: [
                Triangle::new(0.0, 0.0, 40.0),
                Triangle::new(20.0, 120.0, 400.0),
                Triangle::new(200.0, LENGTH_CAP, LENGTH_CAP),
            ],
        }
    }
}

impl MembershipCatalog {
    /// The triangle for a (variable, level) pair.
    pub fn triangle(&self, variable: Variable, level: Level) -> Triangle {
        let bands = match variable {
            Variable::Confidence => &self.confidence,
            Variable::Spam => &self.spam,
            Variable::Toxicity => &self.toxicity,
            Variable::Length => &self.length,
        };
        match level {
            Level::Low => bands[0],
            Level::Medium => bands[1],
            Level::High => bands[2],
        }
    }

    /// Folds a raw value into the domain the variable's bands cover.
    fn fold(&self, variable: Variable, value: f64) -> f64 {
        match variable {
            Variable::Length => value.clamp(0.0, LENGTH_CAP),
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(toxicity: f64, spam: f64, confidence: f64, length: f64) -> FuzzyInput {
        FuzzyInput {
            toxicity,
            spam,
            confidence,
            length,
        }
    }

    #[test]
    fn is_condition_evaluates_membership() {
        let catalog = MembershipCatalog::default();
        let condition = Condition::is(Variable::Toxicity, Level::High);
        // (0.7, 1, 1): membership at 0.85 is halfway up the slope.
        let activation = condition.evaluate(&input(0.85, 0.0, 0.0, 10.0), &catalog);
        assert!((activation - 0.5).abs() < 1e-9);
    }

    #[test]
    fn and_takes_minimum() {
        let catalog = MembershipCatalog::default();
        let condition = Condition::is(Variable::Spam, Level::High)
            .and(Condition::is(Variable::Confidence, Level::High));
        // spam 1.0 -> 1.0 membership; confidence 0.75 -> 0.5 membership.
        let activation = condition.evaluate(&input(0.0, 1.0, 0.75, 10.0), &catalog);
        assert!((activation - 0.5).abs() < 1e-9);
    }

    #[test]
    fn or_takes_maximum() {
        let catalog = MembershipCatalog::default();
        let condition = Condition::is(Variable::Spam, Level::High)
            .or(Condition::is(Variable::Confidence, Level::High));
        let activation = condition.evaluate(&input(0.0, 1.0, 0.75, 10.0), &catalog);
        assert!((activation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn length_values_are_capped() {
        let catalog = MembershipCatalog::default();
        let condition = Condition::is(Variable::Length, Level::High);
        // Far beyond the cap still sits on the long shoulder.
        let activation = condition.evaluate(&input(0.0, 0.0, 0.0, 50_000.0), &catalog);
        assert_eq!(activation, 1.0);
    }

    #[test]
    fn rule_weight_is_clamped() {
        let rule = Rule::new(
            "w",
            Condition::is(Variable::Spam, Level::Low),
            Action::Allowed,
            1.7,
        );
        assert_eq!(rule.weight, 1.0);
    }

    #[test]
    fn default_rule_set_is_nonempty() {
        let rules = RuleSet::moderation_defaults();
        assert_eq!(rules.len(), 6);
        assert!(rules.rules.iter().any(|r| r.action == Action::Blocked));
        assert!(rules.rules.iter().any(|r| r.action == Action::Flagged));
        assert!(rules.rules.iter().any(|r| r.action == Action::Allowed));
    }

    #[test]
    fn rule_set_serialization_round_trips() {
        let rules = RuleSet::moderation_defaults();
        let json = serde_json::to_string(&rules).unwrap();
        let decoded: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(rules, decoded);
    }

    #[test]
    fn action_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Action::Blocked).unwrap(),
            "\"blocked\""
        );
        assert_eq!(
            serde_json::to_string(&Action::Flagged).unwrap(),
            "\"flagged\""
        );
        assert_eq!(
            serde_json::to_string(&Action::Allowed).unwrap(),
            "\"allowed\""
        );
    }
}
