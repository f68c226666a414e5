//! Explainable HVAC control with two chained Mamdani fuzzy inference stages.
//!
//! Each control cycle takes a [`SensorReading`] through:
//!
//! 1. the [`OccupancyEstimator`], which fuses CO₂ and lighting into an occupancy likelihood;
//! 2. the [`TemperatureForecaster`], which predicts the indoor temperature change from the
//!    indoor and outdoor temperatures and that likelihood;
//! 3. the [`DecisionLayer`], which picks an [`HvacAction`] from the likelihood and the
//!    forecast temperature.
//!
//! Every stage result keeps its fuzzified inputs and per-rule firing strengths, so the
//! [`Evaluation`] can be serialized and narrated.
//!
//! ```no_run
//! use hvac_fuzzy::{Pipeline, PipelineConfig, SensorReading};
//!
//! # fn main() -> Result<(), hvac_fuzzy::Error> {
//! let pipeline = Pipeline::from_config(&PipelineConfig::load()?)?;
//! let evaluation = pipeline.evaluate(&SensorReading::new(18., 5., 900., 80.)?)?;
//!
//! println!("{}: {}", evaluation.action, evaluation.action.describe());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decision;
pub mod dsl;
pub mod error;
pub mod forecast;
pub mod inference;
pub mod inputs;
mod linspace;
mod math;
pub mod membership;
pub mod occupancy;
pub mod ops;
pub mod outputs;
pub mod pipeline;
pub mod reading;
pub mod rules;
pub mod terms;
pub mod variable;

pub use config::PipelineConfig;
pub use decision::{DecisionLayer, HvacAction};
pub use error::{ConfigError, Error, ValidationError};
pub use forecast::{ForecastResult, TemperatureForecaster};
pub use inference::InferenceEngine;
pub use membership::MembershipShape;
pub use occupancy::{OccupancyConfidence, OccupancyEstimator, OccupancyResult};
pub use pipeline::{Evaluation, Pipeline, SharedPipeline};
pub use reading::SensorReading;
pub use rules::{Rule, RuleBase};
pub use variable::{FuzzyVariable, Variable, Variables};
