//! YAML model files: named blocks plus the connections between them.

use std::collections::BTreeMap;
use std::path::Path;

use ct_core::CompId;
use ct_sim::Model;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BlockError, BlockResult};
use crate::kind::BlockKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    pub name: String,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDef {
    pub from: String,
    #[serde(default)]
    pub output: usize,
    pub to: String,
    #[serde(default)]
    pub input: usize,
    /// Consumer reads the value latched at the last committed step.
    #[serde(default)]
    pub delayed: bool,
}

/// A block diagram as written in a model file.
///
/// ```yaml
/// blocks:
///   - { name: x, type: Integrator, initial: 1.0 }
///   - { name: k, type: Gain, gain: -1.0 }
/// connections:
///   - { from: x, to: k }
///   - { from: k, to: x }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub blocks: Vec<BlockDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

/// A [`Model`] together with the ids of its named blocks.
#[derive(Debug)]
pub struct BuiltModel {
    pub model: Model,
    pub ids: BTreeMap<String, CompId>,
}

impl BuiltModel {
    pub fn id(&self, name: &str) -> BlockResult<CompId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| BlockError::UnknownBlock {
                name: name.to_string(),
            })
    }
}

impl ModelFile {
    pub fn from_yaml_str(content: &str) -> BlockResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load_yaml(path: &Path) -> BlockResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> BlockResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Instantiate every block and wire the connections.
    ///
    /// Port indices are checked here; cycles are only detected when the
    /// director schedules the model.
    pub fn build(&self) -> BlockResult<BuiltModel> {
        let mut built = BuiltModel {
            model: Model::new(),
            ids: BTreeMap::new(),
        };
        for def in &self.blocks {
            if built.ids.contains_key(&def.name) {
                return Err(BlockError::DuplicateBlock {
                    name: def.name.clone(),
                });
            }
            let block = def.kind.build(&def.name)?;
            let id = built.model.add_boxed(def.name.clone(), block);
            built.ids.insert(def.name.clone(), id);
        }
        for conn in &self.connections {
            let from = built.id(&conn.from)?;
            let to = built.id(&conn.to)?;
            if conn.delayed {
                built
                    .model
                    .connect_delayed(from, conn.output, to, conn.input)?;
            } else {
                built.model.connect(from, conn.output, to, conn.input)?;
            }
        }
        debug!(
            blocks = self.blocks.len(),
            connections = self.connections.len(),
            "model file built"
        );
        Ok(built)
    }
}
