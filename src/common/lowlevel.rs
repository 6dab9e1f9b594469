use super::State;

use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LowLevelOpenNode {
    pub(crate) state: State,
    pub(crate) f_open_cost: usize,
    pub(crate) g_cost: usize,
    // Insertion counter, so that neighbor emission order breaks ties.
    pub(crate) order: usize,
}

impl Ord for LowLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_open_cost
            .cmp(&other.f_open_cost)
            // Higher g cost (time) has higher priority
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.order.cmp(&other.order))
            .then_with(|| self.state.cmp(&other.state))
    }
}

impl PartialOrd for LowLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
