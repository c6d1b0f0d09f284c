//! Network-specific error types.

use ct_core::{CompId, PortId};

use crate::network::PortKind;

pub type GraphResult<T> = Result<T, GraphError>;

/// Network construction, validation and scheduling errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A reference to a component that doesn't exist.
    InvalidCompRef { comp: CompId },

    /// A reference to a port that doesn't exist.
    InvalidPortRef { port: PortId },

    /// A component has no port at the requested position.
    PortIndexOob {
        comp: CompId,
        kind: PortKind,
        index: usize,
        len: usize,
    },

    /// A port was used with the wrong direction (e.g. an input as a connection source).
    PortKindMismatch { port: PortId, expected: PortKind },

    /// A port's component field doesn't match the component listing it.
    PortCompMismatch {
        port: PortId,
        expected: CompId,
        actual: CompId,
    },

    /// An input port already has a driver; inputs accept a single connection.
    InputAlreadyDriven { port: PortId },

    /// Two components share a name.
    DuplicateName { name: String },

    /// No connection exists between the given ports.
    UnknownConnection { from: PortId, to: PortId },

    /// The same-instant dependency graph contains a cycle.
    ///
    /// `chain` lists the components along the cycle in dependency order; the
    /// last one feeds the first.
    CyclicDependency { chain: Vec<CompId>, names: Vec<String> },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidCompRef { comp } => {
                write!(f, "Component {} does not exist", comp)
            }
            GraphError::InvalidPortRef { port } => {
                write!(f, "Port {} does not exist", port)
            }
            GraphError::PortIndexOob {
                comp,
                kind,
                index,
                len,
            } => {
                write!(
                    f,
                    "Component {} has no {:?} port {} (it has {})",
                    comp, kind, index, len
                )
            }
            GraphError::PortKindMismatch { port, expected } => {
                write!(f, "Port {} is not an {:?} port", port, expected)
            }
            GraphError::PortCompMismatch {
                port,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Port {} should belong to component {} but references {}",
                    port, expected, actual
                )
            }
            GraphError::InputAlreadyDriven { port } => {
                write!(f, "Input port {} is already connected", port)
            }
            GraphError::DuplicateName { name } => {
                write!(f, "Component name '{}' is used more than once", name)
            }
            GraphError::UnknownConnection { from, to } => {
                write!(f, "No connection from port {} to port {}", from, to)
            }
            GraphError::CyclicDependency { names, .. } => {
                write!(f, "Same-instant dependency cycle: ")?;
                for name in names {
                    write!(f, "{} -> ", name)?;
                }
                match names.first() {
                    Some(first) => write!(f, "{}", first),
                    None => write!(f, "(empty)"),
                }
            }
        }
    }
}

impl std::error::Error for GraphError {}
