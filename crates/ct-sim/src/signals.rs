//! Port value storage and per-component wiring.

use ct_graph::{Coupling, Network};

use crate::component::InputSource;

/// Input sources and output slots of every component, resolved once per
/// topology revision.
#[derive(Clone, Debug, Default)]
pub(crate) struct Wiring {
    pub inputs: Vec<Vec<InputSource>>,
    pub outputs: Vec<Vec<usize>>,
}

impl Wiring {
    pub fn new(net: &Network) -> Self {
        let inputs = net
            .components()
            .iter()
            .map(|comp| {
                comp.inputs
                    .iter()
                    .map(|&port| match net.driver(port) {
                        None => InputSource::Unconnected,
                        Some(conn) => match conn.coupling {
                            Coupling::Direct => InputSource::Live(conn.from.slot()),
                            Coupling::Delayed => InputSource::Latched(conn.from.slot()),
                        },
                    })
                    .collect()
            })
            .collect();
        let outputs = net
            .components()
            .iter()
            .map(|comp| comp.outputs.iter().map(|p| p.slot()).collect())
            .collect();
        Self { inputs, outputs }
    }
}

/// Port values, indexed by port slot.
///
/// `values` holds what was written during the round in progress; `latched`
/// holds the values as of the last committed step and feeds delayed
/// connections.
#[derive(Clone, Debug, Default)]
pub(crate) struct SignalTable {
    pub values: Vec<f64>,
    pub latched: Vec<f64>,
}

impl SignalTable {
    /// Grow to `ports` slots; existing values are kept.
    pub fn resize(&mut self, ports: usize) {
        self.values.resize(ports, 0.0);
        self.latched.resize(ports, 0.0);
    }

    pub fn latch(&mut self) {
        self.latched.copy_from_slice(&self.values);
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.latched.clear();
    }
}
