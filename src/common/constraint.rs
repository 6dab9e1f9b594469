use super::Location;

use std::collections::HashSet;

/// Forbids occupying `location` at exactly `time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexConstraint {
    pub time: usize,
    pub location: Location,
}

/// Forbids moving `from -> to` between `time` and `time + 1`.
///
/// Directional: the reverse move is not affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeConstraint {
    pub time: usize,
    pub from: Location,
    pub to: Location,
}

impl VertexConstraint {
    pub const fn new(time: usize, location: Location) -> Self {
        VertexConstraint { time, location }
    }
}

impl EdgeConstraint {
    pub const fn new(time: usize, from: Location, to: Location) -> Self {
        EdgeConstraint { time, from, to }
    }
}

/// The constraint set of one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub vertex_constraints: HashSet<VertexConstraint>,
    pub edge_constraints: HashSet<EdgeConstraint>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the constraint was already present.
    pub fn add_vertex(&mut self, constraint: VertexConstraint) -> bool {
        self.vertex_constraints.insert(constraint)
    }

    /// Returns `false` if the constraint was already present.
    pub fn add_edge(&mut self, constraint: EdgeConstraint) -> bool {
        self.edge_constraints.insert(constraint)
    }

    /// Merges `other` into this set.
    pub fn extend(&mut self, other: &Constraints) {
        self.vertex_constraints
            .extend(other.vertex_constraints.iter().copied());
        self.edge_constraints
            .extend(other.edge_constraints.iter().copied());
    }

    pub fn forbids_vertex(&self, time: usize, location: Location) -> bool {
        self.vertex_constraints
            .contains(&VertexConstraint::new(time, location))
    }

    pub fn forbids_edge(&self, time: usize, from: Location, to: Location) -> bool {
        self.edge_constraints
            .contains(&EdgeConstraint::new(time, from, to))
    }

    /// Whether `location` is forbidden at `time` or any later time step.
    pub fn forbids_vertex_from(&self, time: usize, location: Location) -> bool {
        self.vertex_constraints
            .iter()
            .any(|constraint| constraint.location == location && constraint.time >= time)
    }

    /// Latest time step named by any constraint, if any.
    pub fn latest_time(&self) -> Option<usize> {
        let vertex = self.vertex_constraints.iter().map(|c| c.time);
        let edge = self.edge_constraints.iter().map(|c| c.time);
        vertex.chain(edge).max()
    }

    pub fn len(&self) -> usize {
        self.vertex_constraints.len() + self.edge_constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_constraints.is_empty() && self.edge_constraints.is_empty()
    }
}
