//! Incremental network builder.

use ct_core::{CompId, ConnId, PortId};

use crate::error::{GraphError, GraphResult};
use crate::network::{ComponentNode, Connection, Coupling, Feedthrough, Network, Port, PortKind};
use crate::validate;

/// Builder for constructing a signal network incrementally.
///
/// Use `add_component` and `connect` to build up the network, then call
/// `build()` to validate it and take an immutable `Network` snapshot. The
/// builder stays usable afterwards, so the owner of a running model can keep
/// editing it between steps and rebuild.
#[derive(Debug, Default, Clone)]
pub struct NetworkBuilder {
    components: Vec<ComponentNode>,
    ports: Vec<Port>,
    connections: Vec<Connection>,
    next_conn_id: u32,
    revision: u64,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        components: Vec<ComponentNode>,
        ports: Vec<Port>,
        connections: Vec<Connection>,
        next_conn_id: u32,
        revision: u64,
    ) -> Self {
        Self {
            components,
            ports,
            connections,
            next_conn_id,
            revision,
        }
    }

    /// Number of components added so far.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Structural revision; bumped by every edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add a component with the given number of input and output ports.
    ///
    /// Ports are created in order: all inputs first, then all outputs.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        inputs: usize,
        outputs: usize,
        feedthrough: Feedthrough,
    ) -> CompId {
        let comp_id = CompId::from_slot(self.components.len());

        let input_ids = (0..inputs)
            .map(|index| self.push_port(comp_id, PortKind::Input, index))
            .collect();
        let output_ids = (0..outputs)
            .map(|index| self.push_port(comp_id, PortKind::Output, index))
            .collect();

        self.components.push(ComponentNode {
            id: comp_id,
            name: name.into(),
            feedthrough,
            inputs: input_ids,
            outputs: output_ids,
        });
        self.revision += 1;
        comp_id
    }

    fn push_port(&mut self, comp: CompId, kind: PortKind, index: usize) -> PortId {
        let id = PortId::from_slot(self.ports.len());
        self.ports.push(Port {
            id,
            comp,
            kind,
            index,
        });
        id
    }

    /// Rename a component.
    pub fn rename_component(&mut self, comp_id: CompId, new_name: impl Into<String>) {
        if let Some(comp) = self.components.get_mut(comp_id.slot()) {
            comp.name = new_name.into();
            self.revision += 1;
        }
    }

    /// The `index`-th input port of a component.
    pub fn input(&self, comp: CompId, index: usize) -> GraphResult<PortId> {
        self.port_at(comp, PortKind::Input, index)
    }

    /// The `index`-th output port of a component.
    pub fn output(&self, comp: CompId, index: usize) -> GraphResult<PortId> {
        self.port_at(comp, PortKind::Output, index)
    }

    fn port_at(&self, comp: CompId, kind: PortKind, index: usize) -> GraphResult<PortId> {
        let node = self
            .components
            .get(comp.slot())
            .ok_or(GraphError::InvalidCompRef { comp })?;
        let list = match kind {
            PortKind::Input => &node.inputs,
            PortKind::Output => &node.outputs,
        };
        list.get(index).copied().ok_or(GraphError::PortIndexOob {
            comp,
            kind,
            index,
            len: list.len(),
        })
    }

    /// Connect an output port to an input port with zero delay.
    pub fn connect(&mut self, from: PortId, to: PortId) -> GraphResult<ConnId> {
        self.connect_with(from, to, Coupling::Direct)
    }

    /// Connect an output port to an input port through a step-boundary latch.
    pub fn connect_delayed(&mut self, from: PortId, to: PortId) -> GraphResult<ConnId> {
        self.connect_with(from, to, Coupling::Delayed)
    }

    /// Connect two ports with an explicit coupling.
    pub fn connect_with(
        &mut self,
        from: PortId,
        to: PortId,
        coupling: Coupling,
    ) -> GraphResult<ConnId> {
        self.expect_kind(from, PortKind::Output)?;
        self.expect_kind(to, PortKind::Input)?;
        if self.connections.iter().any(|c| c.to == to) {
            return Err(GraphError::InputAlreadyDriven { port: to });
        }

        let id = ConnId::from_index(self.next_conn_id);
        self.next_conn_id += 1;
        self.connections.push(Connection {
            id,
            from,
            to,
            coupling,
        });
        self.revision += 1;
        Ok(id)
    }

    /// Remove the connection between two ports.
    pub fn disconnect(&mut self, from: PortId, to: PortId) -> GraphResult<ConnId> {
        let pos = self
            .connections
            .iter()
            .position(|c| c.from == from && c.to == to)
            .ok_or(GraphError::UnknownConnection { from, to })?;
        let removed = self.connections.remove(pos);
        self.revision += 1;
        Ok(removed.id)
    }

    fn expect_kind(&self, port: PortId, expected: PortKind) -> GraphResult<()> {
        let p = self
            .ports
            .get(port.slot())
            .ok_or(GraphError::InvalidPortRef { port })?;
        if p.kind != expected {
            return Err(GraphError::PortKindMismatch { port, expected });
        }
        Ok(())
    }

    /// Validate the current structure and take an immutable snapshot.
    pub fn build(&self) -> GraphResult<Network> {
        validate::validate_structure(&self.components, &self.ports, &self.connections)?;

        let mut drivers = vec![None; self.ports.len()];
        for (i, conn) in self.connections.iter().enumerate() {
            drivers[conn.to.slot()] = Some(i);
        }

        Ok(Network {
            components: self.components.clone(),
            ports: self.ports.clone(),
            connections: self.connections.clone(),
            drivers,
            revision: self.revision,
            next_conn_id: self.next_conn_id,
        })
    }
}
