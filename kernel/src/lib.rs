//! Causal kernel: the deterministic collaborators of permutation search.
//!
//! # API Surface
//!
//! - [`variable::VariableSetV1`] -- the fixed variable universe of one search
//! - [`score::ScoreProvider`] -- decomposable local score contract
//! - [`knowledge::KnowledgeV1`] -- tiers plus required/forbidden edges
//! - [`graph::MixedGraphV1`] -- directed/undirected edge container
//! - [`meek`] -- Meek-rule closure and DAG → CPDAG reversion
//! - [`proof`] -- canonical JSON and domain-separated SHA-256
//!
//! # Module Dependency Direction
//!
//! `variable` ← `score`, `knowledge` ← `graph` ← `meek`
//!
//! `proof` depends on nothing internal. No search logic lives here.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod graph;
pub mod knowledge;
pub mod meek;
pub mod proof;
pub mod score;
pub mod variable;
