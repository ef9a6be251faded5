//! Table score: explicit local scores keyed by `(node, parent set)`.

use std::collections::BTreeMap;

use causal_kernel::score::ScoreProvider;
use causal_kernel::variable::{VariableError, VariableSetV1};

/// Score provider backed by a lookup table.
///
/// Parent sets are stored sorted, so lookups ignore parent order. Missing
/// entries score `base − penalty · |parents|`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableScore {
    variables: VariableSetV1,
    entries: BTreeMap<(usize, Vec<usize>), f64>,
    base: f64,
    penalty: f64,
}

impl TableScore {
    /// Empty table over `names`.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError`] for empty or duplicate names.
    pub fn new<I, S>(names: I, base: f64, penalty: f64) -> Result<Self, VariableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            variables: VariableSetV1::from_names(names)?,
            entries: BTreeMap::new(),
            base,
            penalty,
        })
    }

    /// Set the score of `node` given exactly `parents`.
    pub fn set(&mut self, node: usize, parents: &[usize], score: f64) -> &mut Self {
        let mut key = parents.to_vec();
        key.sort_unstable();
        self.entries.insert((node, key), score);
        self
    }

    /// Name-keyed [`Self::set`]. Unknown names are ignored and reported as
    /// `false`.
    pub fn set_named(&mut self, node: &str, parents: &[&str], score: f64) -> bool {
        let Some(n) = self.variables.index_of(node) else {
            return false;
        };
        let Some(ps) = parents
            .iter()
            .map(|p| self.variables.index_of(p))
            .collect::<Option<Vec<usize>>>()
        else {
            return false;
        };
        self.set(n, &ps, score);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScoreProvider for TableScore {
    fn variables(&self) -> &VariableSetV1 {
        &self.variables
    }

    #[allow(clippy::cast_precision_loss)]
    fn local_score(&self, node: usize, parents: &[usize]) -> f64 {
        let mut key = parents.to_vec();
        key.sort_unstable();
        self.entries
            .get(&(node, key))
            .copied()
            .unwrap_or(self.base - self.penalty * parents.len() as f64)
    }

    fn score_id(&self) -> &str {
        "table"
    }
}
