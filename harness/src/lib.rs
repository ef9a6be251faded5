//! Causal Harness: concrete scores, data, simulation and run packaging.
//!
//! The harness drives the search layer end to end: it supplies score
//! providers over tables or data, simulates linear-Gaussian data with a known
//! DAG, runs the orchestrator into a digest-bound report, and measures how
//! close an estimate is to the truth.
//!
//! The harness does NOT implement search logic; it delegates to
//! `causal_search`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compare;
pub mod data;
pub mod runner;
pub mod scores;
pub mod simulate;
