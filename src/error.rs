use thiserror::Error;

use crate::common::Location;

/// Errors raised while building or querying an [`Environment`](crate::env::Environment).
///
/// A single agent failing to find a path is not an error: searches report that
/// through `Option`.
#[derive(Debug, Error)]
pub enum MapfError {
    #[error("agent {0:?} is not registered")]
    UnknownAgent(String),

    #[error("agent {0:?} is registered more than once")]
    DuplicateAgent(String),

    #[error("{which} {location} of agent {agent:?} lies outside the {width}x{height} grid")]
    OutOfBounds {
        agent: String,
        which: &'static str,
        location: Location,
        width: i32,
        height: i32,
    },

    #[error("{which} {location} of agent {agent:?} is an obstacle")]
    BlockedLocation {
        agent: String,
        which: &'static str,
        location: Location,
    },

    #[error("agents {first:?} and {second:?} share the start {location}")]
    DuplicateStart {
        first: String,
        second: String,
        location: Location,
    },

    #[error("agents {first:?} and {second:?} share the goal {location}")]
    DuplicateGoal {
        first: String,
        second: String,
        location: Location,
    },

    #[error("obstacle {location} lies outside the {width}x{height} grid")]
    ObstacleOutOfBounds {
        location: Location,
        width: i32,
        height: i32,
    },

    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    #[error("malformed map file: {0}")]
    MalformedMap(String),

    #[error("not enough free cells for {requested} agents ({available} available)")]
    NotEnoughFreeCells { requested: usize, available: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type MapfResult<T> = Result<T, MapfError>;
