//! ct-graph: signal network layer for the continuous-time engine.
//!
//! Provides:
//! - Network data structures (components, input/output ports, connections)
//! - Incremental network builder with validation
//! - Dependency scheduler producing a cached, deterministic evaluation order
//!
//! # Example
//!
//! ```
//! use ct_graph::{Feedthrough, NetworkBuilder, Scheduler};
//!
//! let mut builder = NetworkBuilder::new();
//! let src = builder.add_component("source", 0, 1, Feedthrough::Direct);
//! let gain = builder.add_component("gain", 1, 1, Feedthrough::Direct);
//! let out = builder.output(src, 0).unwrap();
//! let inp = builder.input(gain, 0).unwrap();
//! builder.connect(out, inp).unwrap();
//! let network = builder.build().unwrap();
//!
//! let mut scheduler = Scheduler::new();
//! let schedule = scheduler.schedule(&network).unwrap();
//! assert_eq!(schedule.order(), &[src, gain]);
//! ```

pub mod builder;
pub mod error;
pub mod network;
pub mod schedule;
pub(crate) mod validate;

pub use builder::NetworkBuilder;
pub use error::{GraphError, GraphResult};
pub use network::{ComponentNode, Connection, Coupling, Feedthrough, Network, Port, PortKind};
pub use schedule::{compute_order, dependency_edges, Schedule, Scheduler};
