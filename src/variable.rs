use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use tracing::warn;

use crate::error::ConfigError;
use crate::linspace::Linspace;
use crate::math::interp;
use crate::membership::MembershipShape;
use crate::terms::{Label, Terms};

/// Samples taken across a variable's domain when no explicit step is configured.
pub const DEFAULT_SAMPLES: usize = 201;

/// Upper bound on the samples a configured step may produce.
pub const MAX_SAMPLES: usize = 100_000;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Typed handle to a variable registered in [`Variables`].
///
/// `L` is the variable's label enum, so rules built through the handle can only
/// name labels the variable actually declares.
pub struct Variable<L>(pub(crate) VariableKey, PhantomData<L>);

impl<L> Variable<L> {
    pub fn key(self) -> VariableKey {
        self.0
    }
}

impl<L> Clone for Variable<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Variable<L> {}

impl<L> fmt::Debug for Variable<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&self.0).finish()
    }
}

/// A named scalar domain with its linguistic terms.
///
/// The domain is sampled once at construction; the samples are the output
/// universe used for centroid defuzzification when the variable is the
/// consequent of a rule base.
#[derive(Clone, Debug)]
pub struct FuzzyVariable {
    name: String,
    min: f64,
    max: f64,
    terms: IndexMap<String, MembershipShape>,
    universe: Vec<f64>,
    // Parallel to `terms`
    sampled: Vec<Vec<f64>>,
}

impl FuzzyVariable {
    /// If the step value is not provided, the domain is sampled at [`DEFAULT_SAMPLES`] points.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        universe_range: RangeInclusive<f64>,
        terms: impl IntoIterator<Item = (S, MembershipShape)>,
        step: Option<f64>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let min = *universe_range.start();
        let max = *universe_range.end();

        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ConfigError::InvalidDomain { variable: name, min, max });
        }

        let universe: Vec<f64> = match step {
            Some(step) if !(step.is_finite() && step > 0.) || (max - min) / step >= MAX_SAMPLES as f64 => {
                return Err(ConfigError::InvalidStep { variable: name, step });
            },
            Some(step) => Linspace::with_step(min, max, step).collect(),
            None => Linspace::new(min, max, DEFAULT_SAMPLES).collect(),
        };

        let mut term_map = IndexMap::new();

        for (label, shape) in terms {
            let label = label.into();

            if !shape.is_well_formed() {
                return Err(ConfigError::InvalidShape {
                    variable: name,
                    label,
                    points: shape.breakpoints(),
                });
            }

            let (low, high) = shape.support();

            if low < min || high > max {
                warn!(
                    variable = %name,
                    term = %label,
                    %shape,
                    min,
                    max,
                    "term support leaves the variable domain; inputs are clamped to the domain"
                );
            }

            if term_map.contains_key(&label) {
                return Err(ConfigError::DuplicateTerm { variable: name, label });
            }

            term_map.insert(label, shape);
        }

        if term_map.is_empty() {
            return Err(ConfigError::NoTerms(name));
        }

        let sampled = term_map
            .values()
            .map(|shape| interp(universe.iter().copied(), &shape.coords()))
            .collect();

        Ok(Self {
            name,
            min,
            max,
            terms: term_map,
            universe,
            sampled,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> RangeInclusive<f64> {
        self.min..=self.max
    }

    pub fn midpoint(&self) -> f64 {
        self.min + (self.max - self.min) / 2.
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn shape(&self, label: &str) -> Option<&MembershipShape> {
        self.terms.get(label)
    }

    pub(crate) fn term_index(&self, label: &str) -> Option<usize> {
        self.terms.get_index_of(label)
    }

    pub(crate) fn universe(&self) -> &[f64] {
        &self.universe
    }

    pub(crate) fn sampled(&self, term: usize) -> &[f64] {
        &self.sampled[term]
    }

    /// Degree of every term at `x`, after clamping `x` to the domain.
    ///
    /// Degrees are not normalized; overlapping terms need not sum to 1.
    pub fn fuzzify(&self, x: f64) -> Fuzzified {
        let clamped = self.clamp(x);
        let degrees = self
            .terms
            .iter()
            .map(|(label, shape)| (label.clone(), shape.membership(clamped)))
            .collect();

        Fuzzified {
            variable: self.name.clone(),
            crisp: x,
            clamped,
            degrees,
        }
    }

    /// A term's degrees over the sampled universe, as `(x, degree)` pairs.
    pub fn curve(&self, label: &str) -> Option<impl Iterator<Item = (f64, f64)> + '_> {
        let index = self.term_index(label)?;

        Some(self.universe.iter().copied().zip(self.sampled[index].iter().copied()))
    }
}

/// A crisp value turned into term degrees.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fuzzified {
    pub variable: String,
    /// The value as supplied
    pub crisp: f64,
    /// The value actually evaluated, after clamping to the domain
    pub clamped: f64,
    pub degrees: IndexMap<String, f64>,
}

impl Fuzzified {
    pub fn degree(&self, label: &str) -> Option<f64> {
        self.degrees.get(label).copied()
    }

    pub fn was_clamped(&self) -> bool {
        self.crisp != self.clamped
    }
}

/// Registry of every variable used by a pipeline.
///
/// Rule bases resolve their variables through the registry and keep shared
/// references to them, so a variable that is the output of one stage and an
/// input of the next is one definition, not two.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    slots: SlotMap<VariableKey, Arc<FuzzyVariable>>,
    names: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variable whose terms are keyed by the label enum `L`.
    /// Every label of `L` must have a shape.
    pub fn add<L: Label>(
        &mut self,
        name: &str,
        universe_range: RangeInclusive<f64>,
        terms: Terms<L>,
        step: Option<f64>,
    ) -> Result<Variable<L>, ConfigError> {
        if let Some(missing) = terms.first_missing() {
            return Err(ConfigError::MissingTerm {
                variable: name.to_owned(),
                label: missing.name().to_owned(),
            });
        }

        let variable = FuzzyVariable::new(
            name,
            universe_range,
            terms.iter().map(|(label, shape)| (label.name(), shape)),
            step,
        )?;
        let key = self.insert(variable)?;

        Ok(Variable(key, PhantomData))
    }

    pub fn insert(&mut self, variable: FuzzyVariable) -> Result<VariableKey, ConfigError> {
        if self.names.contains_key(variable.name()) {
            return Err(ConfigError::DuplicateVariable(variable.name.clone()));
        }

        let name = variable.name.clone();
        let key = self.slots.insert(Arc::new(variable));

        self.names.insert(name, key);

        Ok(key)
    }

    pub fn get(&self, key: VariableKey) -> Option<&Arc<FuzzyVariable>> {
        self.slots.get(key)
    }

    pub fn lookup(&self, name: &str) -> Option<VariableKey> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::labels! {
        enum Light {
            Dark => "dark",
            Dim => "dim",
            Bright => "bright",
        }
    }

    fn lighting() -> FuzzyVariable {
        FuzzyVariable::new(
            "lighting",
            0. ..=100.,
            [
                ("dark", MembershipShape::Trapezoidal(0., 0., 10., 30.)),
                ("dim", MembershipShape::Triangular(10., 35., 60.)),
                ("bright", MembershipShape::Trapezoidal(40., 70., 100., 100.)),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_fuzzify() {
        let var = lighting();
        let fuzzified = var.fuzzify(50.);

        assert_eq!(fuzzified.degree("dark"), Some(0.));
        assert!((fuzzified.degree("dim").unwrap() - 0.4).abs() < 1e-12);
        assert!((fuzzified.degree("bright").unwrap() - 1. / 3.).abs() < 1e-12);
        assert_eq!(fuzzified.degree("blinding"), None);
        assert!(!fuzzified.was_clamped());
    }

    #[test]
    fn test_fuzzify_clamps_to_domain() {
        let var = lighting();

        let below = var.fuzzify(-50.);
        assert_eq!(below.clamped, 0.);
        assert_eq!(below.degree("dark"), Some(1.));
        assert!(below.was_clamped());

        let above = var.fuzzify(1e9);
        assert_eq!(above.clamped, 100.);
        assert_eq!(above.degree("bright"), Some(1.));
    }

    #[test]
    fn test_default_sampling() {
        let var = lighting();

        assert_eq!(var.universe().len(), DEFAULT_SAMPLES);
        assert_eq!(var.universe().first(), Some(&0.));
        assert_eq!(var.universe().last(), Some(&100.));
        assert_eq!(var.midpoint(), 50.);

        let index = var.term_index("dim").unwrap();
        let curve: Vec<_> = var.curve("dim").unwrap().collect();

        assert_eq!(curve.len(), DEFAULT_SAMPLES);
        assert_eq!(curve[70], (35., 1.));
        assert!(curve.iter().map(|(_, d)| *d).eq(var.sampled(index).iter().copied()));
        assert!(var.curve("blinding").is_none());
    }

    #[test]
    fn test_rejects_malformed_variables() {
        let bad_shape = FuzzyVariable::new("co2", 0. ..=1., [("low", MembershipShape::Triangular(0.5, 0.2, 1.))], None);
        assert!(matches!(bad_shape, Err(ConfigError::InvalidShape { label, .. }) if label == "low"));

        let bad_domain = FuzzyVariable::new("co2", 1. ..=1., [("low", MembershipShape::Triangular(0., 0., 1.))], None);
        assert!(matches!(bad_domain, Err(ConfigError::InvalidDomain { .. })));

        let low = [("low", MembershipShape::Triangular(0., 0., 1.))];

        let bad_step = FuzzyVariable::new("co2", 0. ..=1., low, Some(0.));
        assert!(matches!(bad_step, Err(ConfigError::InvalidStep { .. })));

        let tiny_step = FuzzyVariable::new("co2", 300. ..=1000., low, Some(1e-300));
        assert!(matches!(tiny_step, Err(ConfigError::InvalidStep { step, .. }) if step == 1e-300));

        let too_fine = FuzzyVariable::new("co2", 300. ..=1000., low, Some(1e-7));
        assert!(matches!(too_fine, Err(ConfigError::InvalidStep { .. })));

        let finest = FuzzyVariable::new("co2", 0. ..=1., low, Some(1. / (MAX_SAMPLES - 1) as f64)).unwrap();
        assert!((MAX_SAMPLES - 1..=MAX_SAMPLES).contains(&finest.universe().len()));

        let no_terms = FuzzyVariable::new::<&str>("co2", 0. ..=1., [], None);
        assert!(matches!(no_terms, Err(ConfigError::NoTerms(name)) if name == "co2"));
    }

    #[test]
    fn test_registry() {
        let mut vars = Variables::new();
        let light = vars.add("lighting", 0. ..=100., Terms::<Light>::partition(0., 100.), Some(1.)).unwrap();

        assert_eq!(vars.lookup("lighting"), Some(light.key()));
        assert_eq!(vars.get(light.key()).unwrap().universe().len(), 101);

        let twice = vars.add("lighting", 0. ..=100., Terms::<Light>::partition(0., 100.), None);
        assert!(matches!(twice, Err(ConfigError::DuplicateVariable(name)) if name == "lighting"));

        let mut partial = Terms::<Light>::new();
        partial.insert(Light::Dark, MembershipShape::Triangular(0., 0., 50.));

        let missing = vars.add("lamp", 0. ..=100., partial, None);
        assert!(matches!(missing, Err(ConfigError::MissingTerm { label, .. }) if label == "dim"));
        assert_eq!(vars.len(), 1);
    }
}
