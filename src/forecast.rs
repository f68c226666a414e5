//! Stage two: predicted change of the indoor temperature over the next control window.

use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, ValidationError};
use crate::inference::InferenceEngine;
use crate::inputs::Inputs;
use crate::occupancy::OccupancyLevel;
use crate::outputs::Outputs;
use crate::rules::{Rule, RuleBase};
use crate::variable::{Variable, Variables};

crate::labels! {
    pub enum IndoorLevel {
        Cold => "cold",
        Comfortable => "comfortable",
        Warm => "warm",
    }
}

crate::labels! {
    pub enum OutdoorLevel {
        Cold => "cold",
        Mild => "mild",
        Warm => "warm",
    }
}

crate::labels! {
    /// Sign of the predicted temperature change
    pub enum DeltaLevel {
        Negative => "negative",
        Zero => "zero",
        Positive => "positive",
    }
}

pub const RULE_BASE: &str = "forecast";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Predicted change in °C
    pub delta_t: f64,
    /// `indoor_temp + delta_t`
    pub t_future: f64,
    pub inference: Outputs,
}

impl ForecastResult {
    pub fn unfired(&self) -> bool {
        self.inference.unfired()
    }
}

#[derive(Clone, Debug)]
pub struct TemperatureForecaster {
    indoor: Variable<IndoorLevel>,
    outdoor: Variable<OutdoorLevel>,
    occupancy: Variable<OccupancyLevel>,
    engine: InferenceEngine,
}

impl TemperatureForecaster {
    /// `rules` may read the indoor temperature, the outdoor temperature and
    /// the occupancy likelihood, and must conclude on `delta`.
    pub fn new(
        vars: &Variables,
        indoor: Variable<IndoorLevel>,
        outdoor: Variable<OutdoorLevel>,
        occupancy: Variable<OccupancyLevel>,
        delta: Variable<DeltaLevel>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self, ConfigError> {
        let rules = RuleBase::new(RULE_BASE, vars, delta.key(), rules)?;
        let supplied = [indoor.key(), outdoor.key(), occupancy.key()];

        if let Some(var) = rules
            .input_keys()
            .zip(rules.inputs())
            .find_map(|(key, var)| (!supplied.contains(&key)).then_some(var))
        {
            return Err(ConfigError::UnsuppliedInput {
                rule_base: RULE_BASE.to_owned(),
                variable: var.name().to_owned(),
            });
        }

        Ok(Self {
            indoor,
            outdoor,
            occupancy,
            engine: InferenceEngine::new(rules),
        })
    }

    pub fn rules(&self) -> &RuleBase {
        self.engine.rules()
    }

    /// `occupancy` is the crisp likelihood produced by the occupancy stage.
    pub fn forecast(&self, indoor: f64, outdoor: f64, occupancy: f64) -> Result<ForecastResult, ValidationError> {
        let inputs = Inputs::new()
            .with(self.indoor, indoor)
            .with(self.outdoor, outdoor)
            .with(self.occupancy, occupancy);
        let inference = self.engine.eval(&inputs)?;
        let delta_t = inference.value();
        let t_future = indoor + delta_t;

        debug!(indoor, outdoor, occupancy, delta_t, t_future, "forecast temperature");

        Ok(ForecastResult {
            delta_t,
            t_future,
            inference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::Terms;

    crate::labels! {
        enum Co2 {
            Low => "low",
            High => "high",
        }
    }

    struct Fixture {
        vars: Variables,
        indoor: Variable<IndoorLevel>,
        outdoor: Variable<OutdoorLevel>,
        occupancy: Variable<OccupancyLevel>,
        delta: Variable<DeltaLevel>,
    }

    fn fixture() -> Fixture {
        let mut vars = Variables::new();
        let indoor = vars.add("indoor_temp", 10. ..=35., Terms::partition(10., 35.), None).unwrap();
        let outdoor = vars.add("outdoor_temp", -10. ..=40., Terms::partition(-10., 40.), None).unwrap();
        let occupancy = vars.add("occupancy", 0. ..=1., Terms::partition(0., 1.), None).unwrap();
        let delta = vars.add("delta_t", -3. ..=3., Terms::partition(-3., 3.), None).unwrap();

        Fixture {
            vars,
            indoor,
            outdoor,
            occupancy,
            delta,
        }
    }

    #[test]
    fn test_forecast() {
        let Fixture {
            vars,
            indoor,
            outdoor,
            occupancy,
            delta,
        } = fixture();
        let forecaster = TemperatureForecaster::new(
            &vars,
            indoor,
            outdoor,
            occupancy,
            delta,
            [
                Rule::new(outdoor.is(OutdoorLevel::Cold), delta.is(DeltaLevel::Negative)),
                Rule::new(outdoor.is(OutdoorLevel::Warm), delta.is(DeltaLevel::Positive)),
                Rule::new(
                    outdoor.is(OutdoorLevel::Mild).and(occupancy.is_not(OccupancyLevel::Occupied)),
                    delta.is(DeltaLevel::Zero),
                ),
            ],
        )
        .unwrap();

        let cold = forecaster.forecast(20., -10., 0.).unwrap();

        assert!(cold.delta_t < 0.);
        assert_eq!(cold.t_future, 20. + cold.delta_t);
        assert!(!cold.unfired());

        let warm = forecaster.forecast(20., 40., 0.).unwrap();

        assert!(warm.delta_t > 0.);

        let mild = forecaster.forecast(20., 15., 0.).unwrap();

        assert!(mild.delta_t.abs() < 1e-9);
        assert_eq!(mild.inference.firings()[2].strength, 1.);
    }

    #[test]
    fn test_rejects_unsupplied_inputs() {
        let Fixture {
            mut vars,
            indoor,
            outdoor,
            occupancy,
            delta,
        } = fixture();
        let co2 = vars.add("co2", 300. ..=1000., Terms::<Co2>::partition(300., 1000.), None).unwrap();

        let result = TemperatureForecaster::new(
            &vars,
            indoor,
            outdoor,
            occupancy,
            delta,
            [Rule::new(co2.is(Co2::High), delta.is(DeltaLevel::Positive))],
        );

        assert!(matches!(
            result,
            Err(ConfigError::UnsuppliedInput { variable, .. }) if variable == "co2"
        ));
    }
}
