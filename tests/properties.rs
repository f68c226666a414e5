//! Property-based tests for the illustrative pipeline.
//!
//! Uses proptest to check that evaluation is deterministic, total over finite
//! readings, and that the occupancy likelihood is monotone in both sensors.

use std::sync::OnceLock;

use hvac_fuzzy::{DecisionLayer, HvacAction, MembershipShape, Pipeline, PipelineConfig, SensorReading};
use proptest::prelude::*;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/illustrative.toml");

/// Slack for float rounding in the centroid sums.
const EPSILON: f64 = 1e-9;

fn pipeline() -> &'static Pipeline {
    static PIPELINE: OnceLock<Pipeline> = OnceLock::new();

    PIPELINE.get_or_init(|| Pipeline::from_config(&PipelineConfig::load_from_file(FIXTURE).unwrap()).unwrap())
}

fn likelihood(co2: f64, lighting: f64) -> f64 {
    pipeline().occupancy().estimate(co2, lighting).unwrap().likelihood
}

fn reading() -> impl Strategy<Value = SensorReading> {
    (-20.0..50.0f64, -30.0..50.0f64, 200.0..1500.0f64, -10.0..120.0f64)
        .prop_map(|(indoor, outdoor, co2, lighting)| SensorReading::new(indoor, outdoor, co2, lighting).unwrap())
}

// =============================================================================
// Evaluation Properties
// =============================================================================

proptest! {
    /// Same reading, same evaluation, down to every firing strength
    #[test]
    fn prop_evaluate_deterministic(reading in reading()) {
        let first = pipeline().evaluate(&reading).unwrap();
        let second = pipeline().evaluate(&reading).unwrap();

        prop_assert_eq!(first, second);
    }

    /// Any finite reading evaluates, and every crisp result stays within its domain
    #[test]
    fn prop_finite_readings_evaluate(
        indoor in -1e6..1e6f64,
        outdoor in -1e6..1e6f64,
        co2 in -1e6..1e6f64,
        lighting in -1e6..1e6f64,
    ) {
        let reading = SensorReading::new(indoor, outdoor, co2, lighting).unwrap();
        let evaluation = pipeline().evaluate(&reading);

        prop_assert!(evaluation.is_ok());

        let evaluation = evaluation.unwrap();

        prop_assert!((0. ..=1.).contains(&evaluation.occupancy.likelihood));
        prop_assert!((-3. ..=3.).contains(&evaluation.forecast.delta_t));
        prop_assert_eq!(evaluation.forecast.t_future, indoor + evaluation.forecast.delta_t);
        prop_assert!(evaluation.forecast.inference.firings().iter().all(|f| (0. ..=1.).contains(&f.strength)));
    }

    /// OFF exactly when the likelihood misses the threshold
    #[test]
    fn prop_off_iff_unoccupied(reading in reading()) {
        let evaluation = pipeline().evaluate(&reading).unwrap();

        prop_assert_eq!(evaluation.action == HvacAction::Off, !evaluation.occupied);
    }
}

// =============================================================================
// Monotonicity Properties
// =============================================================================

proptest! {
    /// More CO₂ never lowers the likelihood, lighting fixed
    #[test]
    fn prop_occupancy_monotone_in_co2(a in 200.0..1200.0f64, b in 200.0..1200.0f64, lighting in -10.0..120.0f64) {
        let (low, high) = (a.min(b), a.max(b));

        prop_assert!(likelihood(low, lighting) <= likelihood(high, lighting) + EPSILON);
    }

    /// More light never lowers the likelihood, CO₂ fixed
    #[test]
    fn prop_occupancy_monotone_in_lighting(co2 in 200.0..1200.0f64, a in -10.0..120.0f64, b in -10.0..120.0f64) {
        let (low, high) = (a.min(b), a.max(b));

        prop_assert!(likelihood(co2, low) <= likelihood(co2, high) + EPSILON);
    }
}

// =============================================================================
// Membership and Decision Properties
// =============================================================================

proptest! {
    /// Membership is total and within [0, 1], NaN included
    #[test]
    fn prop_membership_in_unit_interval(
        x in any::<f64>(),
        a in -100.0..100.0f64,
        w1 in 0.0..50.0f64,
        w2 in 0.0..50.0f64,
        w3 in 0.0..50.0f64,
    ) {
        let triangle = MembershipShape::Triangular(a, a + w1, a + w1 + w2);
        let trapezoid = MembershipShape::Trapezoidal(a, a + w1, a + w1 + w2, a + w1 + w2 + w3);

        prop_assert!((0. ..=1.).contains(&triangle.membership(x)));
        prop_assert!((0. ..=1.).contains(&trapezoid.membership(x)));
    }

    /// The decision layer answers for every pair of floats
    #[test]
    fn prop_decision_total(occupancy in any::<f64>(), t_future in any::<f64>()) {
        let layer = DecisionLayer::new(&Default::default()).unwrap();
        let action = layer.decide(occupancy, t_future);

        prop_assert_eq!(action == HvacAction::Off, !(occupancy >= 0.5));
    }
}
