//! Mamdani-style fuzzy inference over classification results.
//!
//! Every rule is fuzzified against the crisp input tuple and contributes
//! `activation x weight` to its action's pool (zero when it stays
//! silent), and each pool defuzzifies to `0.7 x max + 0.3 x mean` over
//! all of the action's rules. The best action wins
//! unless its score sits below the acceptance threshold, in which case
//! the permissive default applies: the system is tuned to avoid false
//! positives from a single weakly-activated rule.
//!
//! Total function over its numeric domain; no failure mode, no
//! randomness, and rule ordering cannot affect the outcome.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{Action, FuzzyInput, MembershipCatalog, RuleSet};
use crate::classifier::ClassificationResult;

/// Winning score below this forces the permissive default action.
pub const ACCEPT_THRESHOLD: f64 = 0.8;

/// Defuzzified score per action.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionScores {
    /// Score of the allowed action.
    pub allowed: f64,
    /// Score of the flagged action.
    pub flagged: f64,
    /// Score of the blocked action.
    pub blocked: f64,
}

impl ActionScores {
    /// Returns the score for `action`.
    pub fn get(&self, action: Action) -> f64 {
        match action {
            Action::Allowed => self.allowed,
            Action::Flagged => self.flagged,
            Action::Blocked => self.blocked,
        }
    }

    fn set(&mut self, action: Action, score: f64) {
        match action {
            Action::Allowed => self.allowed = score,
            Action::Flagged => self.flagged = score,
            Action::Blocked => self.blocked = score,
        }
    }

    /// Returns the action with the highest score (first in
    /// [`Action::all`] order on ties).
    pub fn argmax(&self) -> Action {
        let mut best = Action::Allowed;
        for &action in Action::all() {
            if self.get(action) > self.get(best) {
                best = action;
            }
        }
        best
    }
}

/// How strongly one rule fired, kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleActivation {
    /// The rule's identifier.
    pub rule_id: String,
    /// The action the rule votes for.
    pub action: Action,
    /// Predicate activation in `[0, 1]`.
    pub activation: f64,
    /// `activation x weight`, the pool contribution.
    pub contribution: f64,
}

/// Terminal output of the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// The policy action to take.
    pub action: Action,
    /// The defuzzified score of the winning action. Kept as the audit
    /// score even when the threshold override forces `action` to the
    /// permissive default.
    pub score: f64,
    /// Full per-action score map.
    pub scores: ActionScores,
    /// Per-rule firing record.
    pub activations: Vec<RuleActivation>,
    /// True when the winning score fell below the acceptance threshold
    /// and the action was forced to allowed.
    pub overridden: bool,
}

/// Rule-based inference engine over (toxicity, spam, confidence, length).
///
/// Immutable after construction; shared read-only across invocations.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    rules: RuleSet,
    catalog: MembershipCatalog,
    accept_threshold: f64,
}

impl DecisionEngine {
    /// Creates an engine over the given rules and membership bands.
    pub fn new(rules: RuleSet, catalog: MembershipCatalog, accept_threshold: f64) -> Self {
        Self {
            rules,
            catalog,
            accept_threshold,
        }
    }

    /// Creates an engine with the default moderation rules, default
    /// membership bands, and the standard acceptance threshold.
    pub fn with_defaults() -> Self {
        Self::new(
            RuleSet::moderation_defaults(),
            MembershipCatalog::default(),
            ACCEPT_THRESHOLD,
        )
    }

    /// The rule set this engine evaluates.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decides the policy action for a classification result and the
    /// original message length in characters.
    pub fn decide(&self, classification: &ClassificationResult, message_length: usize) -> Decision {
        let input = FuzzyInput {
            toxicity: classification.probabilities.toxic,
            spam: classification.probabilities.spam,
            confidence: classification.confidence,
            length: message_length as f64,
        };
        self.decide_input(&input)
    }

    /// Decides directly from a crisp input tuple.
    pub fn decide_input(&self, input: &FuzzyInput) -> Decision {
        let mut activations = Vec::with_capacity(self.rules.len());
        for rule in &self.rules.rules {
            let activation = rule.condition.evaluate(input, &self.catalog);
            activations.push(RuleActivation {
                rule_id: rule.id.clone(),
                action: rule.action,
                activation,
                contribution: activation * rule.weight,
            });
        }

        let mut scores = ActionScores::default();
        for &action in Action::all() {
            scores.set(action, defuzzify(&activations, action));
        }

        let winner = scores.argmax();
        let winning_score = scores.get(winner);

        // Threshold override: a weakly-won decision is not acted on.
        let (action, overridden) = if winning_score < self.accept_threshold {
            (Action::Allowed, winner != Action::Allowed)
        } else {
            (winner, false)
        };

        debug!(
            action = action.name(),
            score = winning_score,
            overridden,
            "fuzzy decision"
        );

        Decision {
            action,
            score: winning_score,
            scores,
            activations,
            overridden,
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Combines an action's contribution pool, one entry per rule assigned
/// to the action: `0.7 x max + 0.3 x mean`. A silent rule stays in the
/// pool at zero, so the aggregate is continuous in the inputs and a rule
/// waking up can only add to the score it votes for. An action with no
/// rules scores 0.
fn defuzzify(activations: &[RuleActivation], action: Action) -> f64 {
    let pool: Vec<f64> = activations
        .iter()
        .filter(|a| a.action == action)
        .map(|a| a.contribution)
        .collect();
    if pool.is_empty() {
        return 0.0;
    }
    let max = pool.iter().cloned().fold(0.0, f64::max);
    let mean = pool.iter().sum::<f64>() / pool.len() as f64;
    0.7 * max + 0.3 * mean
}
