use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::inputs::Inputs;
use crate::ops::{aggregate, centroid, clip};
use crate::outputs::{Outputs, RuleFiring};
use crate::rules::RuleBase;
use crate::variable::Fuzzified;

/// Mamdani inference over one rule base: min/max connectives, min implication,
/// max aggregation and centroid defuzzification.
#[derive(Clone, Debug)]
pub struct InferenceEngine {
    rules: RuleBase,
}

impl InferenceEngine {
    pub fn new(rules: RuleBase) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }

    /// Every input variable of the rule base must have a finite value in `inputs`.
    /// Values outside a variable's domain are clamped to it.
    pub fn eval(&self, inputs: &Inputs) -> Result<Outputs, ValidationError> {
        let rules = &self.rules;

        // Fuzzificate
        let mut facts: Vec<Fuzzified> = Vec::with_capacity(rules.inputs.len());

        for (key, var) in &rules.inputs {
            let value = inputs
                .get(*key)
                .ok_or_else(|| ValidationError::MissingInput(var.name().to_owned()))?;

            if !value.is_finite() {
                return Err(ValidationError::NonFiniteInput {
                    variable: var.name().to_owned(),
                    value,
                });
            }

            let fact = var.fuzzify(value);

            if fact.was_clamped() {
                debug!(variable = var.name(), value, clamped = fact.clamped, "input clamped to domain");
            }

            facts.push(fact);
        }

        // Compute firing strengths
        let mut firings = Vec::with_capacity(rules.rules.len());

        for (i, rule) in rules.rules.iter().enumerate() {
            let degrees = rule.clauses.iter().map(|clause| {
                let degree = facts[clause.input].degrees[clause.term];

                if clause.negated {
                    1. - degree
                } else {
                    degree
                }
            });
            let strength = rule.connective.fold(degrees).unwrap_or(0.) * rule.weight;

            firings.push(RuleFiring {
                rule: i,
                text: rule.text.clone(),
                consequent: rule.label.clone(),
                strength,
            });
        }

        // Aggregate
        let output = rules.output();
        let mut aggregated = vec![0.; output.universe().len()];

        for (rule, firing) in rules.rules.iter().zip(&firings) {
            if firing.strength > 0. {
                let clipped = output.sampled(rule.term).iter().map(|mu| clip(*mu, firing.strength));

                aggregate(&mut aggregated, clipped);
            }
        }

        // Defuzzificate
        let (value, unfired) = match centroid(output.universe(), &aggregated) {
            Some(value) => (value, false),
            None => {
                warn!(
                    rule_base = rules.name(),
                    output = output.name(),
                    "no rule fired; falling back to the domain midpoint"
                );

                (output.midpoint(), true)
            },
        };

        debug!(rule_base = rules.name(), output = output.name(), value, unfired, "inference complete");

        Ok(Outputs::new(output.name().to_owned(), value, unfired, facts, firings))
    }
}
