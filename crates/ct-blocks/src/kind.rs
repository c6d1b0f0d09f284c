//! Serializable block descriptions.

use ct_sim::Component;
use serde::{Deserialize, Serialize};

use crate::dynamics::{Integrator, LinearDecay};
use crate::error::{BlockError, BlockResult};
use crate::events::LevelCrossing;
use crate::math::{Gain, Sum};
use crate::sources::{Constant, Step};

/// Block type and parameters, tagged by `type` in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockKind {
    Constant {
        value: f64,
    },
    Gain {
        gain: f64,
    },
    /// One input per sign character, e.g. `"+-"`.
    Sum {
        signs: String,
    },
    Step {
        at: f64,
        #[serde(default)]
        before: f64,
        after: f64,
    },
    Integrator {
        #[serde(default)]
        initial: f64,
    },
    LinearDecay {
        rate: f64,
        initial: f64,
    },
    LevelCrossing {
        level: f64,
        #[serde(default = "default_crossing_tolerance")]
        tolerance: f64,
    },
}

fn default_crossing_tolerance() -> f64 {
    LevelCrossing::DEFAULT_TOLERANCE
}

impl BlockKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Constant { .. } => "Constant",
            BlockKind::Gain { .. } => "Gain",
            BlockKind::Sum { .. } => "Sum",
            BlockKind::Step { .. } => "Step",
            BlockKind::Integrator { .. } => "Integrator",
            BlockKind::LinearDecay { .. } => "LinearDecay",
            BlockKind::LevelCrossing { .. } => "LevelCrossing",
        }
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        match *self {
            BlockKind::Constant { value } => vec![("value", value)],
            BlockKind::Gain { gain } => vec![("gain", gain)],
            BlockKind::Sum { .. } => Vec::new(),
            BlockKind::Step { at, before, after } => {
                vec![("at", at), ("before", before), ("after", after)]
            }
            BlockKind::Integrator { initial } => vec![("initial", initial)],
            BlockKind::LinearDecay { rate, initial } => vec![("rate", rate), ("initial", initial)],
            BlockKind::LevelCrossing { level, tolerance } => {
                vec![("level", level), ("tolerance", tolerance)]
            }
        }
    }

    /// Instantiate the block; `name` is only used in error messages.
    pub fn build(&self, name: &str) -> BlockResult<Box<dyn Component>> {
        if let Some((param, value)) = self.params().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(BlockError::NonFiniteParam {
                block: name.to_string(),
                param,
                value,
            });
        }
        Ok(match self {
            BlockKind::Constant { value } => Box::new(Constant::new(*value)),
            BlockKind::Gain { gain } => Box::new(Gain::new(*gain)),
            BlockKind::Sum { signs } => Box::new(Sum::new(signs)?),
            BlockKind::Step { at, before, after } => Box::new(Step::new(*at, *before, *after)),
            BlockKind::Integrator { initial } => Box::new(Integrator::new(*initial)),
            BlockKind::LinearDecay { rate, initial } => Box::new(LinearDecay::new(*rate, *initial)),
            BlockKind::LevelCrossing { level, tolerance } => {
                Box::new(LevelCrossing::new(*level, *tolerance)?)
            }
        })
    }
}
