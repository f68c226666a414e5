use crate::ops::Connective;
use crate::terms::Label;
use crate::variable::{Variable, VariableKey};

/// `variable IS label`, or `variable IS NOT label` when negated.
#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub(crate) variable: VariableKey,
    pub(crate) label: String,
    pub(crate) negated: bool,
}

impl Clause {
    pub fn new(variable: VariableKey, label: impl Into<String>, negated: bool) -> Self {
        Self {
            variable,
            label: label.into(),
            negated,
        }
    }

    pub fn variable(&self) -> VariableKey {
        self.variable
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn and(self, rhs: Clause) -> Antecedent {
        Antecedent::all([self, rhs])
    }

    pub fn and2(self, rhs: Clause, rhs2: Clause) -> Antecedent {
        Antecedent::all([self, rhs, rhs2])
    }

    pub fn or(self, rhs: Clause) -> Antecedent {
        Antecedent::any([self, rhs])
    }
}

/// Clauses joined by a single connective.
///
/// Antecedents are flat: every clause is combined with the same operator.
#[derive(Clone, Debug, PartialEq)]
pub struct Antecedent {
    pub(crate) connective: Connective,
    pub(crate) clauses: Vec<Clause>,
}

impl Antecedent {
    pub fn new(connective: Connective, clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self {
            connective,
            clauses: clauses.into_iter().collect(),
        }
    }

    /// Conjunction (min) of every clause.
    pub fn all(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self::new(Connective::And, clauses)
    }

    /// Disjunction (max) of every clause.
    pub fn any(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self::new(Connective::Or, clauses)
    }

    pub fn connective(&self) -> Connective {
        self.connective
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl From<Clause> for Antecedent {
    fn from(clause: Clause) -> Self {
        Self::all([clause])
    }
}

impl<L: Label> Variable<L> {
    pub fn is(self, rhs: L) -> Clause {
        Clause::new(self.0, rhs.name(), false)
    }

    pub fn is_not(self, rhs: L) -> Clause {
        Clause::new(self.0, rhs.name(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::Terms;
    use crate::variable::Variables;

    crate::labels! {
        enum Score {
            Low => "low",
            High => "high",
        }
    }

    #[test]
    fn test_builds_antecedents() {
        let mut vars = Variables::new();
        let score = vars.add("score", 150. ..=200., Terms::<Score>::partition(150., 200.), None).unwrap();
        let ratio = vars.add("ratio", 0.1..=1., Terms::<Score>::partition(0.1, 1.), None).unwrap();
        let credit = vars.add("credit", 0. ..=10., Terms::<Score>::partition(0., 10.), None).unwrap();

        let approve = score.is(Score::High).and2(ratio.is(Score::Low), credit.is_not(Score::Low));

        assert_eq!(approve.connective(), Connective::And);
        assert_eq!(approve.clauses().len(), 3);
        assert_eq!(approve.clauses()[1].variable(), ratio.key());
        assert!(approve.clauses()[2].is_negated());

        let reject = score.is(Score::Low).or(ratio.is(Score::High));

        assert_eq!(reject.connective(), Connective::Or);
        assert_eq!(reject.clauses()[1].label(), "high");
        assert_eq!(Antecedent::from(credit.is(Score::High)).clauses().len(), 1);
    }
}
