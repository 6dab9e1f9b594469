mod cbs;

pub use cbs::CBS;

use crate::common::Solution;
use crate::error::MapfResult;
use crate::stat::Stats;

pub trait Solver {
    /// `Ok(None)` when no conflict-free solution was found.
    fn solve(&mut self) -> MapfResult<Option<Solution>>;

    fn stats(&self) -> &Stats;
}
