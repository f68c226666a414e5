use serde::Serialize;

use crate::variable::Fuzzified;

/// How strongly one rule fired during an inference.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleFiring {
    /// Position of the rule in its rule base
    pub rule: usize,
    /// The rule as text, e.g. `IF co2 IS high AND lighting IS bright THEN occupancy IS occupied`
    pub text: String,
    /// The consequent label
    pub consequent: String,
    /// Antecedent degree times rule weight
    pub strength: f64,
}

/// Result of one Mamdani inference.
///
/// Carries the defuzzified value along with every intermediate an explanation
/// needs: the fuzzified inputs and the firing strength of each rule, in rule
/// base order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outputs {
    variable: String,
    value: f64,
    unfired: bool,
    inputs: Vec<Fuzzified>,
    firings: Vec<RuleFiring>,
}

impl Outputs {
    pub(crate) fn new(
        variable: String,
        value: f64,
        unfired: bool,
        inputs: Vec<Fuzzified>,
        firings: Vec<RuleFiring>,
    ) -> Self {
        Self {
            variable,
            value,
            unfired,
            inputs,
            firings,
        }
    }

    /// Name of the output variable
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The defuzzified value. When [`unfired`](Self::unfired) is set this is the
    /// midpoint of the output domain, not an inferred value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// No rule fired with a nonzero strength, so the aggregate was empty.
    pub fn unfired(&self) -> bool {
        self.unfired
    }

    pub fn inputs(&self) -> &[Fuzzified] {
        &self.inputs
    }

    pub fn input(&self, variable: &str) -> Option<&Fuzzified> {
        self.inputs.iter().find(|fact| fact.variable == variable)
    }

    pub fn firings(&self) -> &[RuleFiring] {
        &self.firings
    }

    /// Rules that contributed to the aggregate.
    pub fn fired(&self) -> impl Iterator<Item = &RuleFiring> {
        self.firings.iter().filter(|firing| firing.strength > 0.)
    }

    /// The strongest rule; the earliest one wins ties.
    pub fn strongest(&self) -> Option<&RuleFiring> {
        self.fired()
            .fold(None, |best: Option<&RuleFiring>, firing| match best {
                Some(best) if best.strength >= firing.strength => Some(best),
                _ => Some(firing),
            })
    }
}
