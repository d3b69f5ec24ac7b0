//! World implementations for the harness runner.

pub mod knapsack;
pub mod queens;
pub mod scripted;
