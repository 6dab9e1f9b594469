use super::Location;

/// The first collision between two agents' paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Conflict {
    /// Both agents occupy `location` at `time`.
    Vertex {
        time: usize,
        location: Location,
        agent_1: String,
        agent_2: String,
    },
    /// `agent_1` moves `from -> to` while `agent_2` moves `to -> from`,
    /// between `time` and `time + 1`.
    Edge {
        time: usize,
        from: Location,
        to: Location,
        agent_1: String,
        agent_2: String,
    },
}

impl Conflict {
    pub fn time(&self) -> usize {
        match self {
            Conflict::Vertex { time, .. } | Conflict::Edge { time, .. } => *time,
        }
    }

    pub fn agents(&self) -> (&str, &str) {
        match self {
            Conflict::Vertex {
                agent_1, agent_2, ..
            }
            | Conflict::Edge {
                agent_1, agent_2, ..
            } => (agent_1, agent_2),
        }
    }
}
