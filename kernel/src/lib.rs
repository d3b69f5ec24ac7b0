//! Canopy Kernel: the proof utilities shared by every layer of Canopy.
//!
//! # API Surface
//!
//! - [`proof::canon::canonical_json_bytes`] -- the single canonical JSON encoder
//! - [`proof::hash::canonical_hash`] -- domain-separated SHA-256 content hashing
//!
//! # Module Dependency Direction
//!
//! `hash_domain` ← `hash`, and `canon` stands alone. The search and harness
//! crates route every digest through this crate so that two runs of the same
//! search can be compared byte-for-byte.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod proof;
