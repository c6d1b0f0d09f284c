//! Network validation logic.

use std::collections::HashSet;

use crate::error::{GraphError, GraphResult};
use crate::network::{ComponentNode, Connection, Port, PortKind};

/// Validate the network structure: all references exist, ports are consistent,
/// names are unique and every input has at most one driver.
pub(crate) fn validate_structure(
    components: &[ComponentNode],
    ports: &[Port],
    connections: &[Connection],
) -> GraphResult<()> {
    // Port IDs are contiguous and match their indices
    for (i, port) in ports.iter().enumerate() {
        if port.id.slot() != i {
            return Err(GraphError::InvalidPortRef { port: port.id });
        }
        if port.comp.slot() >= components.len() {
            return Err(GraphError::InvalidCompRef { comp: port.comp });
        }
    }

    let mut names = HashSet::new();
    for comp in components {
        if !names.insert(comp.name.as_str()) {
            return Err(GraphError::DuplicateName {
                name: comp.name.clone(),
            });
        }

        let listed = comp
            .inputs
            .iter()
            .map(|&p| (p, PortKind::Input))
            .chain(comp.outputs.iter().map(|&p| (p, PortKind::Output)));
        for (port_id, kind) in listed {
            let port = ports
                .get(port_id.slot())
                .ok_or(GraphError::InvalidPortRef { port: port_id })?;
            if port.comp != comp.id {
                return Err(GraphError::PortCompMismatch {
                    port: port_id,
                    expected: comp.id,
                    actual: port.comp,
                });
            }
            if port.kind != kind {
                return Err(GraphError::PortKindMismatch {
                    port: port_id,
                    expected: kind,
                });
            }
        }
    }

    let mut driven = HashSet::new();
    for conn in connections {
        let from = ports
            .get(conn.from.slot())
            .ok_or(GraphError::InvalidPortRef { port: conn.from })?;
        let to = ports
            .get(conn.to.slot())
            .ok_or(GraphError::InvalidPortRef { port: conn.to })?;
        if from.kind != PortKind::Output {
            return Err(GraphError::PortKindMismatch {
                port: conn.from,
                expected: PortKind::Output,
            });
        }
        if to.kind != PortKind::Input {
            return Err(GraphError::PortKindMismatch {
                port: conn.to,
                expected: PortKind::Input,
            });
        }
        if !driven.insert(conn.to) {
            return Err(GraphError::InputAlreadyDriven { port: conn.to });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Feedthrough;
    use ct_core::Id;

    fn node(index: u32, name: &str) -> ComponentNode {
        ComponentNode {
            id: Id::from_index(index),
            name: name.into(),
            feedthrough: Feedthrough::Direct,
            inputs: vec![],
            outputs: vec![],
        }
    }

    #[test]
    fn duplicate_names_rejected() {
        let comps = vec![node(0, "x"), node(1, "x")];
        let err = validate_structure(&comps, &[], &[]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateName { name: "x".into() });
    }

    #[test]
    fn port_owned_by_other_component_rejected() {
        let mut a = node(0, "a");
        let b = node(1, "b");
        a.outputs.push(Id::from_index(0));
        let ports = vec![Port {
            id: Id::from_index(0),
            comp: b.id,
            kind: PortKind::Output,
            index: 0,
        }];
        let err = validate_structure(&[a, b], &ports, &[]).unwrap_err();
        assert!(matches!(err, GraphError::PortCompMismatch { .. }));
    }
}
