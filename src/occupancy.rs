//! Stage one: CO₂ concentration and light level fused into an occupancy likelihood.
//!
//! The rule table is fixed: one rule for every CO₂ label against a coarse
//! reading of the light, `dark` or `not dark`, all at full weight. Each step up
//! in CO₂ or out of the dark moves the consequent one label up the occupancy
//! scale `empty`, `doubtful`, `probable`, `occupied`, so mixed evidence lands
//! on one of the two intermediate labels.
//!
//! The likelihood is non-decreasing in both CO₂ and lighting when the CO₂
//! labels and `dark` form a partition (neighbouring degrees sum to 1, at most
//! two labels overlap) and the occupancy labels are ordered along the domain.
//! `partition = [..]` in the configuration produces such labels.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, ValidationError};
use crate::inference::InferenceEngine;
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::rules::{Rule, RuleBase};
use crate::variable::{Variable, Variables};

crate::labels! {
    /// CO₂ concentration
    pub enum Co2Level {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

crate::labels! {
    /// Light level
    pub enum LightLevel {
        Dark => "dark",
        Dim => "dim",
        Bright => "bright",
    }
}

crate::labels! {
    /// Occupancy, from certainly empty to certainly occupied
    pub enum OccupancyLevel {
        Empty => "empty",
        Doubtful => "doubtful",
        Probable => "probable",
        Occupied => "occupied",
    }
}

/// Name of the occupancy rule base, as it appears in logs and errors.
pub const RULE_BASE: &str = "occupancy";

/// How sure the estimator is that someone is present.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyConfidence {
    /// Likelihood of at least 0.7
    Likely,
    /// Likelihood of at least 0.4
    Possible,
    Unlikely,
}

impl OccupancyConfidence {
    pub fn from_likelihood(likelihood: f64) -> Self {
        if likelihood >= 0.7 {
            Self::Likely
        } else if likelihood >= 0.4 {
            Self::Possible
        } else {
            Self::Unlikely
        }
    }
}

impl fmt::Display for OccupancyConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Likely => "likely",
            Self::Possible => "possible",
            Self::Unlikely => "unlikely",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OccupancyResult {
    /// Crisp occupancy likelihood within the occupancy domain
    pub likelihood: f64,
    pub confidence: OccupancyConfidence,
    pub inference: Outputs,
}

impl OccupancyResult {
    /// Inclusive: a likelihood equal to the threshold counts as occupied.
    pub fn is_occupied(&self, threshold: f64) -> bool {
        self.likelihood >= threshold
    }

    pub fn unfired(&self) -> bool {
        self.inference.unfired()
    }
}

#[derive(Clone, Debug)]
pub struct OccupancyEstimator {
    co2: Variable<Co2Level>,
    lighting: Variable<LightLevel>,
    occupancy: Variable<OccupancyLevel>,
    engine: InferenceEngine,
}

impl OccupancyEstimator {
    pub fn new(
        vars: &Variables,
        co2: Variable<Co2Level>,
        lighting: Variable<LightLevel>,
        occupancy: Variable<OccupancyLevel>,
    ) -> Result<Self, ConfigError> {
        use Co2Level::{High, Low, Medium};
        use LightLevel::Dark;
        use OccupancyLevel::{Doubtful, Empty, Occupied, Probable};

        let rules = RuleBase::new(
            RULE_BASE,
            vars,
            occupancy.key(),
            [
                Rule::new(co2.is(Low).and(lighting.is(Dark)), occupancy.is(Empty)),
                Rule::new(co2.is(Low).and(lighting.is_not(Dark)), occupancy.is(Doubtful)),
                Rule::new(co2.is(Medium).and(lighting.is(Dark)), occupancy.is(Doubtful)),
                Rule::new(co2.is(Medium).and(lighting.is_not(Dark)), occupancy.is(Probable)),
                Rule::new(co2.is(High).and(lighting.is(Dark)), occupancy.is(Probable)),
                Rule::new(co2.is(High).and(lighting.is_not(Dark)), occupancy.is(Occupied)),
            ],
        )?;

        Ok(Self {
            co2,
            lighting,
            occupancy,
            engine: InferenceEngine::new(rules),
        })
    }

    /// Handle to the output variable, for stages that read the likelihood.
    pub fn occupancy(&self) -> Variable<OccupancyLevel> {
        self.occupancy
    }

    pub fn rules(&self) -> &RuleBase {
        self.engine.rules()
    }

    pub fn estimate(&self, co2: f64, lighting: f64) -> Result<OccupancyResult, ValidationError> {
        let inputs = Inputs::new().with(self.co2, co2).with(self.lighting, lighting);
        let inference = self.engine.eval(&inputs)?;
        let likelihood = inference.value();

        debug!(co2, lighting, likelihood, "estimated occupancy");

        Ok(OccupancyResult {
            likelihood,
            confidence: OccupancyConfidence::from_likelihood(likelihood),
            inference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipShape::{Trapezoidal, Triangular};
    use crate::terms::Terms;

    fn estimator() -> OccupancyEstimator {
        let mut vars = Variables::new();
        let mut co2_terms = Terms::new();
        let mut light_terms = Terms::new();

        co2_terms.insert(Co2Level::Low, Trapezoidal(300., 300., 350., 425.));
        co2_terms.insert(Co2Level::Medium, Triangular(350., 425., 600.));
        co2_terms.insert(Co2Level::High, Trapezoidal(425., 600., 1000., 1000.));
        light_terms.insert(LightLevel::Dark, Trapezoidal(0., 0., 10., 35.));
        light_terms.insert(LightLevel::Dim, Triangular(10., 35., 60.));
        light_terms.insert(LightLevel::Bright, Trapezoidal(35., 60., 100., 100.));

        let co2 = vars.add("co2", 300. ..=1000., co2_terms, None).unwrap();
        let lighting = vars.add("lighting", 0. ..=100., light_terms, None).unwrap();
        let occupancy = vars.add("occupancy", 0. ..=1., Terms::partition(0., 1.), None).unwrap();

        OccupancyEstimator::new(&vars, co2, lighting, occupancy).unwrap()
    }

    #[test]
    fn test_rule_table() {
        let estimator = estimator();
        let rules = estimator.rules();

        assert_eq!(rules.len(), 6);
        assert_eq!(
            rules.describe(1),
            Some("IF co2 IS low AND lighting IS NOT dark THEN occupancy IS doubtful")
        );
        assert_eq!(
            rules.describe(4),
            Some("IF co2 IS high AND lighting IS dark THEN occupancy IS probable")
        );
    }

    #[test]
    fn test_empty_room() {
        let result = estimator().estimate(350., 5.).unwrap();

        assert!(result.likelihood < 0.3);
        assert!(!result.is_occupied(0.5));
        assert_eq!(result.confidence, OccupancyConfidence::Unlikely);
        assert_eq!(result.inference.strongest().map(|firing| firing.rule), Some(0));
    }

    #[test]
    fn test_busy_room() {
        let result = estimator().estimate(900., 80.).unwrap();

        assert!(result.likelihood > 0.7);
        assert!(result.is_occupied(0.5));
        assert_eq!(result.confidence, OccupancyConfidence::Likely);
    }

    #[test]
    fn test_mixed_evidence() {
        let estimator = estimator();

        // Lights on in fresh air
        let lit = estimator.estimate(330., 90.).unwrap();

        assert_eq!(lit.inference.strongest().map(|firing| firing.consequent.as_str()), Some("doubtful"));
        assert!((lit.likelihood - 1. / 3.).abs() < 1e-4);
        assert!(!lit.is_occupied(0.5));

        // Stale air in the dark
        let dark = estimator.estimate(900., 5.).unwrap();

        assert_eq!(dark.inference.strongest().map(|firing| firing.consequent.as_str()), Some("probable"));
        assert!((dark.likelihood - 2. / 3.).abs() < 1e-4);
        assert!(dark.is_occupied(0.5));
    }

    #[test]
    fn test_every_reading_fires_a_rule() {
        let estimator = estimator();

        for co2 in (0..=80).map(|i| 250. + 10. * i as f64) {
            for lighting in (0..=60).map(|i| -10. + 2. * i as f64) {
                let result = estimator.estimate(co2, lighting).unwrap();

                assert!(!result.unfired(), "no rule fired at co2 {co2}, lighting {lighting}");
            }
        }
    }

    #[test]
    fn test_monotone_on_a_grid() {
        let estimator = estimator();
        let co2s: Vec<f64> = (0..=70).map(|i| 300. + 10. * i as f64).collect();
        let lights: Vec<f64> = (0..=50).map(|i| 2. * i as f64).collect();

        let likelihood = |co2: f64, lighting: f64| estimator.estimate(co2, lighting).unwrap().likelihood;

        for &lighting in &lights {
            for pair in co2s.windows(2) {
                assert!(likelihood(pair[0], lighting) <= likelihood(pair[1], lighting) + 1e-9);
            }
        }

        for &co2 in &co2s {
            for pair in lights.windows(2) {
                assert!(likelihood(co2, pair[0]) <= likelihood(co2, pair[1]) + 1e-9);
            }
        }
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(OccupancyConfidence::from_likelihood(0.7), OccupancyConfidence::Likely);
        assert_eq!(OccupancyConfidence::from_likelihood(0.69), OccupancyConfidence::Possible);
        assert_eq!(OccupancyConfidence::from_likelihood(0.4), OccupancyConfidence::Possible);
        assert_eq!(OccupancyConfidence::from_likelihood(0.1), OccupancyConfidence::Unlikely);
        assert_eq!(OccupancyConfidence::Likely.to_string(), "likely");
    }
}
