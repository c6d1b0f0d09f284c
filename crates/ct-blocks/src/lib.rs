//! A small library of generic signal blocks for the continuous-time director.
//!
//! Sources ([`Constant`], [`Step`]), memoryless arithmetic ([`Gain`],
//! [`Sum`]), state-owning dynamics ([`Integrator`], [`LinearDecay`]) and
//! the [`LevelCrossing`] event detector.
//! Blocks can be instantiated directly or described in YAML through
//! [`ModelFile`].

pub mod demos;
pub mod dynamics;
pub mod error;
pub mod events;
pub mod kind;
pub mod math;
pub mod model_file;
pub mod sources;

pub use demos::Demo;
pub use dynamics::{Integrator, LinearDecay};
pub use error::{BlockError, BlockResult};
pub use events::LevelCrossing;
pub use kind::BlockKind;
pub use math::{Gain, Sum};
pub use model_file::{BlockDef, BuiltModel, ConnectionDef, ModelFile};
pub use sources::{Constant, Step};
