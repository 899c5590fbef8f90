//! API handlers module

pub mod health;
pub mod pagerank;
