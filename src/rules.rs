use std::fmt::Write as _;
use std::sync::Arc;

use crate::dsl::{Antecedent, Clause};
use crate::error::ConfigError;
use crate::ops::Connective;
use crate::variable::{FuzzyVariable, VariableKey, Variables};

/// `IF antecedent THEN consequent`, scaled by a weight in `(0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub(crate) antecedent: Antecedent,
    pub(crate) consequent: Clause,
    pub(crate) weight: f64,
}

impl Rule {
    pub fn new(antecedent: impl Into<Antecedent>, consequent: Clause) -> Self {
        Self {
            antecedent: antecedent.into(),
            consequent,
            weight: 1.,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn antecedent(&self) -> &Antecedent {
        &self.antecedent
    }

    pub fn consequent(&self) -> &Clause {
        &self.consequent
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A clause resolved against the rule base: which input, which term.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedClause {
    pub(crate) input: usize,
    pub(crate) term: usize,
    pub(crate) negated: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedRule {
    pub(crate) connective: Connective,
    pub(crate) clauses: Vec<ResolvedClause>,
    /// Term of the output variable
    pub(crate) term: usize,
    pub(crate) label: String,
    pub(crate) weight: f64,
    pub(crate) text: String,
}

/// An ordered, validated set of rules concluding on one output variable.
///
/// Every variable and term a rule names is checked when the rule base is
/// built; a rule base that exists can always be evaluated given values for
/// its inputs.
#[derive(Clone, Debug)]
pub struct RuleBase {
    name: String,
    pub(crate) inputs: Vec<(VariableKey, Arc<FuzzyVariable>)>,
    pub(crate) output: (VariableKey, Arc<FuzzyVariable>),
    pub(crate) rules: Vec<ResolvedRule>,
}

impl RuleBase {
    pub fn new(
        name: impl Into<String>,
        vars: &Variables,
        output: VariableKey,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let output_var = vars
            .get(output)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownVariable(format!("{output:?}")))?;
        let mut inputs: Vec<(VariableKey, Arc<FuzzyVariable>)> = Vec::new();
        let mut resolved = Vec::new();

        for (i, rule) in rules.into_iter().enumerate() {
            let number = i + 1;

            if !(rule.weight > 0. && rule.weight <= 1.) {
                return Err(ConfigError::InvalidWeight {
                    rule_base: name,
                    rule: number,
                    weight: rule.weight,
                });
            }

            if rule.antecedent.clauses.is_empty() {
                return Err(ConfigError::EmptyAntecedent {
                    rule_base: name,
                    rule: number,
                });
            }

            let consequent = &rule.consequent;

            if consequent.variable != output {
                let variable = vars
                    .get(consequent.variable)
                    .map_or_else(|| format!("{:?}", consequent.variable), |var| var.name().to_owned());

                return Err(ConfigError::ConsequentMismatch {
                    rule_base: name,
                    rule: number,
                    variable,
                    output: output_var.name().to_owned(),
                });
            }

            if consequent.negated {
                return Err(ConfigError::NegatedConsequent {
                    rule_base: name,
                    rule: number,
                });
            }

            let term = output_var
                .term_index(&consequent.label)
                .ok_or_else(|| ConfigError::UnknownTerm {
                    variable: output_var.name().to_owned(),
                    label: consequent.label.clone(),
                })?;

            let mut clauses = Vec::with_capacity(rule.antecedent.clauses.len());

            for clause in &rule.antecedent.clauses {
                if clause.variable == output {
                    return Err(ConfigError::OutputInAntecedent {
                        rule_base: name,
                        rule: number,
                        variable: output_var.name().to_owned(),
                    });
                }

                let input = match inputs.iter().position(|(key, _)| *key == clause.variable) {
                    Some(input) => input,
                    None => {
                        let var = vars
                            .get(clause.variable)
                            .cloned()
                            .ok_or_else(|| ConfigError::UnknownVariable(format!("{:?}", clause.variable)))?;

                        inputs.push((clause.variable, var));
                        inputs.len() - 1
                    },
                };

                let var = &inputs[input].1;
                let term = var.term_index(&clause.label).ok_or_else(|| ConfigError::UnknownTerm {
                    variable: var.name().to_owned(),
                    label: clause.label.clone(),
                })?;

                clauses.push(ResolvedClause {
                    input,
                    term,
                    negated: clause.negated,
                });
            }

            resolved.push(ResolvedRule {
                connective: rule.antecedent.connective,
                text: render(&rule, &inputs, &output_var),
                clauses,
                term,
                label: rule.consequent.label.clone(),
                weight: rule.weight,
            });
        }

        if resolved.is_empty() {
            return Err(ConfigError::NoRules(name));
        }

        Ok(Self {
            name,
            inputs,
            output: (output, output_var),
            rules: resolved,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input variables in order of first use.
    pub fn inputs(&self) -> impl Iterator<Item = &FuzzyVariable> {
        self.inputs.iter().map(|(_, var)| &**var)
    }

    pub fn input_keys(&self) -> impl Iterator<Item = VariableKey> + '_ {
        self.inputs.iter().map(|(key, _)| *key)
    }

    pub fn output(&self) -> &FuzzyVariable {
        &self.output.1
    }

    pub fn output_key(&self) -> VariableKey {
        self.output.0
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The `index`th rule as text.
    pub fn describe(&self, index: usize) -> Option<&str> {
        self.rules.get(index).map(|rule| rule.text.as_str())
    }
}

fn render(rule: &Rule, inputs: &[(VariableKey, Arc<FuzzyVariable>)], output: &FuzzyVariable) -> String {
    let mut text = String::from("IF ");

    for (i, clause) in rule.antecedent.clauses.iter().enumerate() {
        if i > 0 {
            let _ = write!(text, " {} ", rule.antecedent.connective.keyword());
        }

        let name = inputs
            .iter()
            .find(|(key, _)| *key == clause.variable)
            .map_or("?", |(_, var)| var.name());
        let is = if clause.negated { "IS NOT" } else { "IS" };
        let _ = write!(text, "{name} {is} {}", clause.label);
    }

    let _ = write!(text, " THEN {} IS {}", output.name(), rule.consequent.label);

    if rule.weight != 1. {
        let _ = write!(text, " (weight {})", rule.weight);
    }

    text
}
