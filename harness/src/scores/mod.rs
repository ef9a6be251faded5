//! Concrete score providers.
//!
//! - [`TableScore`]: explicit `(node, parent set) → score` entries with a
//!   size-penalized default, for deterministic fixtures.
//! - [`SemBicScore`]: linear-Gaussian BIC over a [`crate::data::DataSetV1`].

pub mod sem_bic;
pub mod table;

pub use sem_bic::SemBicScore;
pub use table::TableScore;
