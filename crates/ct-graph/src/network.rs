//! Core network data structures.

use ct_core::{CompId, ConnId, PortId};

use crate::builder::NetworkBuilder;
use crate::error::{GraphError, GraphResult};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Consumer terminal: reads the value driven by one connection.
    Input,
    /// Producer terminal: written by its component, may fan out.
    Output,
}

/// Whether a connection carries its value within the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Coupling {
    /// Zero-delay: the consumer sees the value written in the current round.
    #[default]
    Direct,
    /// The consumer sees the value latched at the last committed step.
    Delayed,
}

/// How a component's outputs relate to its inputs within one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Feedthrough {
    /// Outputs are an instantaneous function of the inputs.
    #[default]
    Direct,
    /// Outputs depend only on the continuous states the component owns.
    StateOnly,
}

/// A signal terminal of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub comp: CompId,
    pub kind: PortKind,
    /// Position among the component's ports of the same kind.
    pub index: usize,
}

/// A component as seen by the network: identity, name and terminals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    pub id: CompId,
    pub name: String,
    pub feedthrough: Feedthrough,
    pub inputs: Vec<PortId>,
    pub outputs: Vec<PortId>,
}

/// A directed wire from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnId,
    pub from: PortId,
    pub to: PortId,
    pub coupling: Coupling,
}

/// A validated, immutable snapshot of the signal network.
///
/// Components and ports are stored in vectors indexed by their IDs. Every
/// structural edit produces a new snapshot with a higher `revision`, which is
/// what schedule caches key on.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) components: Vec<ComponentNode>,
    pub(crate) ports: Vec<Port>,
    pub(crate) connections: Vec<Connection>,
    /// For each port slot, the index into `connections` of the wire driving it.
    pub(crate) drivers: Vec<Option<usize>>,
    pub(crate) revision: u64,
    pub(crate) next_conn_id: u32,
}

impl Network {
    /// Return all components in insertion order.
    pub fn components(&self) -> &[ComponentNode] {
        &self.components
    }

    /// Return all ports.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Return all connections.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Topology revision this snapshot was built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get a component by ID.
    pub fn component(&self, id: CompId) -> Option<&ComponentNode> {
        self.components.get(id.slot())
    }

    /// Get a port by ID.
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.slot())
    }

    /// Name of a component, or `"?"` for an unknown ID.
    pub fn component_name(&self, id: CompId) -> &str {
        self.component(id).map_or("?", |c| c.name.as_str())
    }

    /// Look a component up by name.
    pub fn find_component(&self, name: &str) -> Option<CompId> {
        self.components.iter().find(|c| c.name == name).map(|c| c.id)
    }

    /// The `index`-th input port of a component.
    pub fn input(&self, comp: CompId, index: usize) -> GraphResult<PortId> {
        let node = self
            .component(comp)
            .ok_or(GraphError::InvalidCompRef { comp })?;
        node.inputs
            .get(index)
            .copied()
            .ok_or(GraphError::PortIndexOob {
                comp,
                kind: PortKind::Input,
                index,
                len: node.inputs.len(),
            })
    }

    /// The `index`-th output port of a component.
    pub fn output(&self, comp: CompId, index: usize) -> GraphResult<PortId> {
        let node = self
            .component(comp)
            .ok_or(GraphError::InvalidCompRef { comp })?;
        node.outputs
            .get(index)
            .copied()
            .ok_or(GraphError::PortIndexOob {
                comp,
                kind: PortKind::Output,
                index,
                len: node.outputs.len(),
            })
    }

    /// The connection driving an input port, if any.
    pub fn driver(&self, input: PortId) -> Option<&Connection> {
        self.drivers
            .get(input.slot())
            .copied()
            .flatten()
            .map(|i| &self.connections[i])
    }

    /// Reopen the network for structural edits.
    ///
    /// The builder keeps all IDs stable; the next `build()` yields a higher
    /// revision.
    pub fn to_builder(&self) -> NetworkBuilder {
        NetworkBuilder::from_parts(
            self.components.clone(),
            self.ports.clone(),
            self.connections.clone(),
            self.next_conn_id,
            self.revision,
        )
    }
}
