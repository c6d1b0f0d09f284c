//! Ordered set of future instants the director must land on.

use ct_core::same_instant;

/// Sorted breakpoint instants with resolution-based deduplication.
#[derive(Clone, Debug, Default)]
pub struct BreakpointSet {
    times: Vec<f64>,
    resolution: f64,
}

impl BreakpointSet {
    pub fn new(resolution: f64) -> Self {
        Self {
            times: Vec::new(),
            resolution,
        }
    }

    /// Insert `t`; returns false if an instant within the resolution is
    /// already present.
    pub fn insert(&mut self, t: f64) -> bool {
        let pos = self.times.partition_point(|&x| x < t);
        let near = |i: usize| {
            self.times
                .get(i)
                .is_some_and(|&x| same_instant(x, t, self.resolution))
        };
        if near(pos) || (pos > 0 && near(pos - 1)) {
            return false;
        }
        self.times.insert(pos, t);
        true
    }

    /// Earliest breakpoint strictly after `now` (beyond the resolution).
    pub fn next_after(&self, now: f64) -> Option<f64> {
        self.times
            .iter()
            .copied()
            .find(|&x| x > now + self.resolution)
    }

    /// Drop every breakpoint at or before `now`; returns how many were dropped.
    pub fn remove_reached(&mut self, now: f64) -> usize {
        let reached = self
            .times
            .partition_point(|&x| x <= now + self.resolution);
        self.times.drain(..reached);
        reached
    }

    pub fn first(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn clear(&mut self) {
        self.times.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.times.iter().copied()
    }
}
