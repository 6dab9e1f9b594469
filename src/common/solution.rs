use super::State;

use indexmap::IndexMap;

/// States of one agent in increasing time order, starting at time 0.
pub type Path = Vec<State>;

/// One path per agent, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    pub paths: IndexMap<String, Path>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: impl Into<String>, path: Path) -> Option<Path> {
        self.paths.insert(agent.into(), path)
    }

    pub fn get(&self, agent: &str) -> Option<&Path> {
        self.paths.get(agent)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// State of `agent` at `time`. Agents whose path has ended stay at their
    /// final state. `None` for unknown agents or empty paths.
    pub fn state_at(&self, agent: &str, time: usize) -> Option<&State> {
        let path = self.paths.get(agent)?;
        path.get(time).or_else(|| path.last())
    }

    /// Sum of path lengths, counted in states.
    pub fn cost(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }

    /// Number of moves of the longest path.
    pub fn makespan(&self) -> usize {
        self.paths
            .values()
            .map(|path| path.len().saturating_sub(1))
            .max()
            .unwrap_or(0)
    }
}
