use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::decision::{DecisionLayer, HvacAction};
use crate::error::{ConfigError, ValidationError};
use crate::forecast::{DeltaLevel, ForecastResult, IndoorLevel, OutdoorLevel, TemperatureForecaster};
use crate::occupancy::{Co2Level, LightLevel, OccupancyEstimator, OccupancyLevel, OccupancyResult};
use crate::reading::SensorReading;
use crate::variable::Variables;

/// Occupancy is a likelihood, whatever the calibration.
const OCCUPANCY_DOMAIN: [f64; 2] = [0., 1.];

/// Everything one control cycle produced, in pipeline order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub reading: SensorReading,
    pub occupancy: OccupancyResult,
    /// Whether `occupancy` reached the decision threshold
    pub occupied: bool,
    pub forecast: ForecastResult,
    pub action: HvacAction,
}

/// The two inference stages and the decision layer, built from one configuration.
///
/// Immutable once built; share it between threads behind an `Arc`, or behind
/// a [`SharedPipeline`] when it must be reloadable.
#[derive(Clone, Debug)]
pub struct Pipeline {
    variables: Variables,
    occupancy: OccupancyEstimator,
    forecaster: TemperatureForecaster,
    decision: DecisionLayer,
}

impl Pipeline {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let mut vars = Variables::new();
        let v = &config.variables;

        let co2 = v.co2.register::<Co2Level>(&mut vars, "co2")?;
        let lighting = v.lighting.register::<LightLevel>(&mut vars, "lighting")?;
        let occupancy = v.occupancy.register::<OccupancyLevel>(&mut vars, "occupancy")?;
        let indoor = v.indoor_temp.register::<IndoorLevel>(&mut vars, "indoor_temp")?;
        let outdoor = v.outdoor_temp.register::<OutdoorLevel>(&mut vars, "outdoor_temp")?;
        let delta = v.delta_t.register::<DeltaLevel>(&mut vars, "delta_t")?;

        if v.occupancy.range != OCCUPANCY_DOMAIN {
            return Err(ConfigError::FixedDomain {
                variable: "occupancy".to_owned(),
                expected: OCCUPANCY_DOMAIN,
                found: v.occupancy.range,
            });
        }

        let [min, max] = v.delta_t.range;

        if min != -max {
            return Err(ConfigError::AsymmetricDomain {
                variable: "delta_t".to_owned(),
                min,
                max,
            });
        }

        let rules = config
            .forecast_rules
            .iter()
            .map(|rule| rule.to_rule(&vars, delta.key()))
            .collect::<Result<Vec<_>, _>>()?;

        let occupancy = OccupancyEstimator::new(&vars, co2, lighting, occupancy)?;
        let forecaster = TemperatureForecaster::new(&vars, indoor, outdoor, occupancy.occupancy(), delta, rules)?;
        let decision = DecisionLayer::new(&config.decision)?;

        info!(
            variables = vars.len(),
            occupancy_rules = occupancy.rules().len(),
            forecast_rules = forecaster.rules().len(),
            threshold = decision.threshold(),
            comfort_low = decision.band().low,
            comfort_high = decision.band().high,
            "built pipeline"
        );

        Ok(Self {
            variables: vars,
            occupancy,
            forecaster,
            decision,
        })
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn occupancy(&self) -> &OccupancyEstimator {
        &self.occupancy
    }

    pub fn forecaster(&self) -> &TemperatureForecaster {
        &self.forecaster
    }

    pub fn decision(&self) -> &DecisionLayer {
        &self.decision
    }

    pub fn evaluate(&self, reading: &SensorReading) -> Result<Evaluation, ValidationError> {
        let occupancy = self.occupancy.estimate(reading.co2(), reading.lighting())?;
        let forecast = self
            .forecaster
            .forecast(reading.indoor_temp(), reading.outdoor_temp(), occupancy.likelihood)?;
        let action = self.decision.decide(occupancy.likelihood, forecast.t_future);

        debug!(
            occupancy = occupancy.likelihood,
            delta_t = forecast.delta_t,
            t_future = forecast.t_future,
            %action,
            "evaluated reading"
        );

        Ok(Evaluation {
            reading: *reading,
            occupied: occupancy.is_occupied(self.decision.threshold()),
            occupancy,
            forecast,
            action,
        })
    }
}

/// A pipeline that can be replaced while other threads evaluate with it.
///
/// Each evaluation runs against the snapshot current when it started.
#[derive(Debug)]
pub struct SharedPipeline {
    current: RwLock<Arc<Pipeline>>,
}

impl SharedPipeline {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            current: RwLock::new(Arc::new(pipeline)),
        }
    }

    pub fn snapshot(&self) -> Arc<Pipeline> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs `pipeline` and returns the one it replaced.
    pub fn replace(&self, pipeline: Pipeline) -> Arc<Pipeline> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *current, Arc::new(pipeline));

        info!("replaced pipeline");

        previous
    }

    /// Builds a pipeline from `config` and installs it. On error the current
    /// pipeline stays in place.
    pub fn reload(&self, config: &PipelineConfig) -> Result<(), ConfigError> {
        self.replace(Pipeline::from_config(config)?);

        Ok(())
    }

    pub fn evaluate(&self, reading: &SensorReading) -> Result<Evaluation, ValidationError> {
        self.snapshot().evaluate(reading)
    }
}

#[test]
fn test_pipeline_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Pipeline>();
    assert_send_sync::<SharedPipeline>();
}
