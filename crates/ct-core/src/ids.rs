//! Dense identifiers for components, ports, connections and integrator states.

use std::fmt;
use std::num::NonZeroU32;

/// Position in one of the network's or director's dense tables.
///
/// Stored off by one in a `NonZeroU32`, which keeps `Option<Id>` at four bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Id for a table position; positions past `u32::MAX - 1` saturate.
    pub fn from_slot(slot: usize) -> Self {
        Self::from_index(u32::try_from(slot).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type CompId = Id;
pub type PortId = Id;
pub type ConnId = Id;
/// Index of an integrator in the director's state vector.
pub type StateId = Id;
