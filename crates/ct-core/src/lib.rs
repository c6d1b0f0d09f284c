//! ct-core: identifiers, float helpers and the shared error type used by the
//! network, solver and director crates.

pub mod error;
pub mod ids;
pub mod numeric;

pub use error::{CtError, CtResult};
pub use ids::*;
pub use numeric::*;
