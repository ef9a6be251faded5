//! Canonical serialization and content hashing for search artifacts.
//!
//! Depends on nothing else in the kernel. Reports, policies and knowledge
//! snapshots are rendered to canonical JSON here and hashed with a typed
//! domain separator.

pub mod canon;
pub mod hash;
pub mod hash_domain;
