//! Proof module: canonical JSON and content hashing.

pub mod canon;
pub mod hash;
pub mod hash_domain;
