//! Canopy Harness: concrete trees and worlds for the search driver.
//!
//! The harness supplies what the search layer treats as external
//! collaborators: an arena-backed [`SearchTree`](canopy_search::contract::SearchTree)
//! that materializes world states on activation, a handful of worlds, and a
//! runner that drives a world to a canonical, digest-bound report.
//!
//! The harness does NOT implement search control. It delegates every
//! navigation decision to `canopy_search`. Worlds provide domain states and
//! propagation only; the runner owns orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod contract;
pub mod runner;
pub mod worlds;
