use std::iter::Sum;

use num::Float;
use serde::{Deserialize, Serialize};

/// Operator combining the clauses of a rule antecedent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    /// Minimum t-norm
    #[default]
    And,
    /// Maximum t-conorm
    Or,
}

impl Connective {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::And => F::min(u, v),
            Self::Or => F::max(u, v),
        }
    }

    /// Combines every degree; `None` for an empty antecedent.
    pub fn fold<F: Float>(self, degrees: impl IntoIterator<Item = F>) -> Option<F> {
        degrees.into_iter().reduce(|u, v| self.call(u, v))
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Mamdani implication: truncates a consequent membership at the rule's firing strength.
#[inline]
pub fn clip<F: Float>(membership: F, strength: F) -> F {
    F::min(membership, strength)
}

/// Folds one clipped consequent into the running aggregate with a pointwise max.
pub fn aggregate<F: Float>(aggregated: &mut [F], clipped: impl IntoIterator<Item = F>) {
    for (acc, value) in aggregated.iter_mut().zip(clipped) {
        *acc = F::max(*acc, value);
    }
}

/// Center of gravity of a sampled membership curve: `Σ(x·μ(x)) / Σμ(x)`.
///
/// Returns `None` when the curve is zero everywhere and the centroid is undefined.
pub fn centroid<F: Float + Sum>(universe: &[F], membership: &[F]) -> Option<F> {
    let den = membership.iter().copied().sum::<F>();

    if !(den > F::zero()) {
        return None;
    }

    let num = universe
        .iter()
        .zip(membership)
        .map(|(x, mu)| *x * *mu)
        .sum::<F>();

    Some(num / den)
}

#[test]
fn test_connectives() {
    assert_eq!(Connective::And.call(0.3, 0.8), 0.3);
    assert_eq!(Connective::Or.call(0.3, 0.8), 0.8);
    assert_eq!(Connective::And.fold([0.9, 0.4, 0.6]), Some(0.4));
    assert_eq!(Connective::Or.fold([0.1f32, 0.4, 0.2]), Some(0.4));
    assert_eq!(Connective::And.fold(Vec::<f64>::new()), None);
}

#[test]
fn test_clip_and_aggregate() {
    let mut aggregated = vec![0.; 5];

    aggregate(&mut aggregated, [0., 0.5, 1., 0.5, 0.].map(|m| clip(m, 0.6)));
    aggregate(&mut aggregated, [0., 0., 0., 0.5, 1.].map(|m| clip(m, 0.2)));

    assert_eq!(aggregated, vec![0., 0.5, 0.6, 0.5, 0.2]);
}

#[test]
fn test_centroid() {
    let universe = [0., 1., 2., 3., 4.];

    assert_eq!(centroid(&universe, &[0., 1., 1., 1., 0.]), Some(2.));
    assert_eq!(centroid(&universe, &[1., 0., 0., 0., 1.]), Some(2.));
    assert_eq!(centroid(&universe, &[0., 0., 0., 0., 0.5]), Some(4.));
    assert_eq!(centroid(&universe, &[0.; 5]), None);
}
