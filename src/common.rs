mod conflict;
mod constraint;
mod highlevel;
mod lowlevel;
mod solution;

pub use conflict::Conflict;
pub use constraint::{Constraints, EdgeConstraint, VertexConstraint};
pub(crate) use highlevel::HighLevelOpenNode;
pub(crate) use lowlevel::LowLevelOpenNode;
pub use solution::{Path, Solution};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid cell. `x` runs along the width, `y` along the height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }

    pub fn manhattan_distance(&self, other: &Location) -> usize {
        (self.x - other.x).unsigned_abs() as usize + (self.y - other.y).unsigned_abs() as usize
    }

    /// Location shifted by `(dx, dy)`, unchecked against any grid.
    pub(crate) fn offset(&self, dx: i32, dy: i32) -> Location {
        Location::new(self.x + dx, self.y + dy)
    }
}

impl From<[i32; 2]> for Location {
    fn from([x, y]: [i32; 2]) -> Self {
        Location::new(x, y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A location at a discrete time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    pub time: usize,
    pub location: Location,
}

impl State {
    pub const fn new(time: usize, location: Location) -> Self {
        State { time, location }
    }

    // Conflict and goal checks compare positions only.
    pub fn equal_except_time(&self, other: &State) -> bool {
        self.location == other.location
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub start: Location,
    pub goal: Location,
}

impl Agent {
    pub fn start_state(&self) -> State {
        State::new(0, self.start)
    }

    pub fn goal_state(&self) -> State {
        State::new(0, self.goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Location::new(0, 0);
        let b = Location::new(3, -2);
        assert_eq!(a.manhattan_distance(&b), 5);
        assert_eq!(b.manhattan_distance(&a), 5);
        assert_eq!(a.manhattan_distance(&a), 0);
    }

    #[test]
    fn test_state_equal_except_time() {
        let a = State::new(1, Location::new(2, 3));
        let b = State::new(7, Location::new(2, 3));
        let c = State::new(1, Location::new(3, 2));
        assert!(a.equal_except_time(&b));
        assert_ne!(a, b);
        assert!(!a.equal_except_time(&c));
    }
}
