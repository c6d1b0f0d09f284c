//! Model: component behaviors plus the network topology that wires them.

use std::fmt;

use ct_core::{CompId, ConnId};
use ct_graph::{GraphResult, Network, NetworkBuilder};

use crate::component::Component;

/// Components and their connections, addressed by `(component, port index)`.
///
/// Port counts and feedthrough are taken from each [`Component`] when it is
/// added.
#[derive(Default)]
pub struct Model {
    pub(crate) builder: NetworkBuilder,
    pub(crate) components: Vec<Box<dyn Component>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component under a unique name.
    pub fn add(&mut self, name: impl Into<String>, component: impl Component + 'static) -> CompId {
        self.add_boxed(name, Box::new(component))
    }

    pub fn add_boxed(&mut self, name: impl Into<String>, component: Box<dyn Component>) -> CompId {
        let id = self.builder.add_component(
            name,
            component.input_count(),
            component.output_count(),
            component.feedthrough(),
        );
        self.components.push(component);
        id
    }

    /// Zero-delay connection from output `output` of `from` to input `input`
    /// of `to`.
    pub fn connect(&mut self, from: CompId, output: usize, to: CompId, input: usize) -> GraphResult<ConnId> {
        let out = self.builder.output(from, output)?;
        let inp = self.builder.input(to, input)?;
        self.builder.connect(out, inp)
    }

    /// Connection whose consumer sees the producer's value from the last
    /// committed step.
    pub fn connect_delayed(
        &mut self,
        from: CompId,
        output: usize,
        to: CompId,
        input: usize,
    ) -> GraphResult<ConnId> {
        let out = self.builder.output(from, output)?;
        let inp = self.builder.input(to, input)?;
        self.builder.connect_delayed(out, inp)
    }

    pub fn disconnect(&mut self, from: CompId, output: usize, to: CompId, input: usize) -> GraphResult<ConnId> {
        let out = self.builder.output(from, output)?;
        let inp = self.builder.input(to, input)?;
        self.builder.disconnect(out, inp)
    }

    pub fn rename(&mut self, comp: CompId, name: impl Into<String>) {
        self.builder.rename_component(comp, name);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Structural revision of the topology.
    pub fn revision(&self) -> u64 {
        self.builder.revision()
    }

    /// Validate the topology and take a snapshot.
    pub fn build_network(&self) -> GraphResult<Network> {
        self.builder.build()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("components", &self.components.len())
            .field("revision", &self.builder.revision())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::EvalContext;
    use crate::error::ComponentResult;
    use ct_graph::{Feedthrough, GraphError};

    struct Stub {
        inputs: usize,
        outputs: usize,
        feedthrough: Feedthrough,
    }

    impl Component for Stub {
        fn input_count(&self) -> usize {
            self.inputs
        }
        fn output_count(&self) -> usize {
            self.outputs
        }
        fn feedthrough(&self) -> Feedthrough {
            self.feedthrough
        }
        fn evaluate(&mut self, _ctx: &mut EvalContext<'_>) -> ComponentResult<()> {
            Ok(())
        }
    }

    fn stub(inputs: usize, outputs: usize, feedthrough: Feedthrough) -> Stub {
        Stub {
            inputs,
            outputs,
            feedthrough,
        }
    }

    #[test]
    fn ports_come_from_component() {
        let mut model = Model::new();
        let a = model.add("a", stub(0, 2, Feedthrough::Direct));
        let b = model.add("b", stub(1, 0, Feedthrough::StateOnly));
        model.connect(a, 1, b, 0).unwrap();

        let net = model.build_network().unwrap();
        assert_eq!(net.component(a).unwrap().outputs.len(), 2);
        assert_eq!(net.component(b).unwrap().feedthrough, Feedthrough::StateOnly);
        assert_eq!(net.connections().len(), 1);
        assert!(matches!(
            model.connect(a, 2, b, 0),
            Err(GraphError::PortIndexOob { index: 2, .. })
        ));
    }

    #[test]
    fn edits_bump_revision() {
        let mut model = Model::new();
        let a = model.add("a", stub(0, 1, Feedthrough::Direct));
        let b = model.add("b", stub(1, 0, Feedthrough::Direct));
        let before = model.revision();
        model.connect_delayed(a, 0, b, 0).unwrap();
        model.disconnect(a, 0, b, 0).unwrap();
        assert_eq!(model.revision(), before + 2);
        assert_eq!(model.len(), 2);
        assert!(format!("{model:?}").contains("components: 2"));
    }
}
