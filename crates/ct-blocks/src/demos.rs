//! Built-in demonstration models.

use std::fmt;
use std::str::FromStr;

use crate::error::{BlockError, BlockResult};
use crate::kind::BlockKind;
use crate::model_file::{BlockDef, BuiltModel, ConnectionDef, ModelFile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demo {
    /// `x' = -x`, `x(0) = 1`.
    Decay,
    /// `p' = v`, `v' = -p`, `p(0) = 1`.
    Oscillator,
    /// First-order lag `y' = 2 (u - y)` driven by a unit step at `t = 1`.
    StepResponse,
}

impl Demo {
    pub const ALL: [Demo; 3] = [Demo::Decay, Demo::Oscillator, Demo::StepResponse];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Decay => "decay",
            Demo::Oscillator => "oscillator",
            Demo::StepResponse => "step-response",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Demo::Decay => "exponential decay x' = -x",
            Demo::Oscillator => "harmonic oscillator from two integrators",
            Demo::StepResponse => "first-order lag driven by a unit step at t = 1",
        }
    }

    /// Block names whose outputs are worth reporting.
    pub fn watched(self) -> &'static [&'static str] {
        match self {
            Demo::Decay => &["x"],
            Demo::Oscillator => &["p", "v"],
            Demo::StepResponse => &["u", "y"],
        }
    }

    pub fn model_file(self) -> ModelFile {
        match self {
            Demo::Decay => ModelFile {
                blocks: vec![block("x", BlockKind::LinearDecay { rate: 1.0, initial: 1.0 })],
                connections: Vec::new(),
            },
            Demo::Oscillator => ModelFile {
                blocks: vec![
                    block("p", BlockKind::Integrator { initial: 1.0 }),
                    block("v", BlockKind::Integrator { initial: 0.0 }),
                    block("neg", BlockKind::Gain { gain: -1.0 }),
                ],
                connections: vec![wire("v", "p", 0), wire("p", "neg", 0), wire("neg", "v", 0)],
            },
            Demo::StepResponse => ModelFile {
                blocks: vec![
                    block(
                        "u",
                        BlockKind::Step {
                            at: 1.0,
                            before: 0.0,
                            after: 1.0,
                        },
                    ),
                    block("err", BlockKind::Sum { signs: "+-".into() }),
                    block("k", BlockKind::Gain { gain: 2.0 }),
                    block("y", BlockKind::Integrator { initial: 0.0 }),
                ],
                connections: vec![
                    wire("u", "err", 0),
                    wire("y", "err", 1),
                    wire("err", "k", 0),
                    wire("k", "y", 0),
                ],
            },
        }
    }

    pub fn build(self) -> BlockResult<BuiltModel> {
        self.model_file().build()
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Demo {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Demo::ALL
            .into_iter()
            .find(|d| d.name() == wanted)
            .ok_or(BlockError::InvalidArg {
                what: "unknown demo model (expected decay, oscillator or step-response)",
            })
    }
}

fn block(name: &str, kind: BlockKind) -> BlockDef {
    BlockDef {
        name: name.to_string(),
        kind,
    }
}

fn wire(from: &str, to: &str, input: usize) -> ConnectionDef {
    ConnectionDef {
        from: from.to_string(),
        output: 0,
        to: to.to_string(),
        input,
        delayed: false,
    }
}
