pub mod algorithm;
pub mod common;
pub mod config;
pub mod env;
pub mod error;
pub mod map;
pub mod scenario;
pub mod solver;
pub mod stat;
