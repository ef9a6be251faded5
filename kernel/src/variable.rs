//! Variable identity and the fixed universe a search runs over.
//!
//! A [`VariableSetV1`] is immutable once built. Indices are dense
//! (`0..len`) and are the only identity used in score queries; names exist
//! for knowledge lookup and for human-readable reports.

use std::collections::HashMap;

use thiserror::Error;

/// One variable: a stable index plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableV1 {
    pub index: usize,
    pub name: String,
}

/// Failure building a [`VariableSetV1`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    #[error("variable name at index {index} is empty")]
    EmptyName { index: usize },
    #[error("duplicate variable name: {name}")]
    DuplicateName { name: String },
    #[error("variable {name} carries index {actual}, expected {expected}")]
    IndexMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// The ordered variable universe for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSetV1 {
    variables: Vec<VariableV1>,
    by_name: HashMap<String, usize>,
}

impl VariableSetV1 {
    /// Build a universe from names; indices follow iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError`] on empty or duplicate names.
    pub fn from_names<I, S>(names: I) -> Result<Self, VariableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| VariableV1 {
                index,
                name: name.into(),
            })
            .collect();
        Self::new(variables)
    }

    /// Build a universe from explicit variables.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::IndexMismatch`] unless `variables[i].index == i`
    /// for every `i`, and [`VariableError::DuplicateName`] /
    /// [`VariableError::EmptyName`] for bad names.
    pub fn new(variables: Vec<VariableV1>) -> Result<Self, VariableError> {
        let mut by_name = HashMap::with_capacity(variables.len());
        for (expected, variable) in variables.iter().enumerate() {
            if variable.index != expected {
                return Err(VariableError::IndexMismatch {
                    name: variable.name.clone(),
                    expected,
                    actual: variable.index,
                });
            }
            if variable.name.is_empty() {
                return Err(VariableError::EmptyName { index: expected });
            }
            if by_name.insert(variable.name.clone(), expected).is_some() {
                return Err(VariableError::DuplicateName {
                    name: variable.name.clone(),
                });
            }
        }
        Ok(Self { variables, by_name })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&VariableV1> {
        self.variables.get(index)
    }

    /// Index of the variable with this name, if any.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Name of the variable at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Indices handed out by this set are
    /// always in range.
    #[must_use]
    pub fn name(&self, index: usize) -> &str {
        &self.variables[index].name
    }

    #[must_use]
    pub fn as_slice(&self) -> &[VariableV1] {
        &self.variables
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariableV1> {
        self.variables.iter()
    }

    /// Render a list of indices as names (for logs and reports).
    #[must_use]
    pub fn names_of(&self, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| self.name(i).to_string()).collect()
    }
}
