//! Background knowledge: temporal tiers plus explicit required/forbidden edges.
//!
//! Knowledge is name-keyed so it can be written before a data set is
//! loaded. [`KnowledgeV1::validate`] binds it to a concrete
//! [`VariableSetV1`] and rejects unknown names and contradictory
//! constraints before any search work begins.
//!
//! Tier semantics: an edge `a → b` is forbidden when `tier(a) > tier(b)`,
//! or when `a` and `b` share a tier marked forbidden-within. Variables
//! outside every tier are unconstrained by tiers.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash};
use crate::proof::hash_domain::HashDomain;
use crate::variable::VariableSetV1;

/// Failure adding or validating knowledge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeError {
    #[error("variable {name} is already in tier {existing}; cannot add to tier {requested}")]
    TierConflict {
        name: String,
        existing: usize,
        requested: usize,
    },
    #[error("edge {from} -> {to} is both required and forbidden")]
    RequiredForbidden { from: String, to: String },
    #[error("knowledge names unknown variable: {name}")]
    UnknownVariable { name: String },
    #[error("self edge {name} -> {name} cannot be required")]
    SelfEdge { name: String },
}

/// Background knowledge for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeV1 {
    tiers: Vec<Vec<String>>,
    tier_of: HashMap<String, usize>,
    forbidden_within: BTreeSet<usize>,
    required: BTreeSet<(String, String)>,
    forbidden: BTreeSet<(String, String)>,
}

impl KnowledgeV1 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `name` in `tier`, growing the tier list as needed.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::TierConflict`] if `name` already sits in a
    /// different tier.
    pub fn add_to_tier(&mut self, tier: usize, name: &str) -> Result<(), KnowledgeError> {
        if let Some(&existing) = self.tier_of.get(name) {
            if existing == tier {
                return Ok(());
            }
            return Err(KnowledgeError::TierConflict {
                name: name.to_string(),
                existing,
                requested: tier,
            });
        }
        if self.tiers.len() <= tier {
            self.tiers.resize_with(tier + 1, Vec::new);
        }
        self.tiers[tier].push(name.to_string());
        self.tier_of.insert(name.to_string(), tier);
        Ok(())
    }

    /// Replace the tier layout with `tiers` (outer index = tier).
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::TierConflict`] if a name appears in two tiers.
    pub fn set_tiers<S: AsRef<str>>(&mut self, tiers: &[Vec<S>]) -> Result<(), KnowledgeError> {
        self.tiers.clear();
        self.tier_of.clear();
        for (tier, names) in tiers.iter().enumerate() {
            if self.tiers.len() <= tier {
                self.tiers.resize_with(tier + 1, Vec::new);
            }
            for name in names {
                self.add_to_tier(tier, name.as_ref())?;
            }
        }
        Ok(())
    }

    /// Mark (or unmark) a tier as having no internal edges.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::RequiredForbidden`] if a required edge lies
    /// inside the tier.
    pub fn set_tier_forbidden_within(
        &mut self,
        tier: usize,
        forbidden: bool,
    ) -> Result<(), KnowledgeError> {
        if !forbidden {
            self.forbidden_within.remove(&tier);
            return Ok(());
        }
        for (from, to) in &self.required {
            if self.tier_index(from) == Some(tier) && self.tier_index(to) == Some(tier) {
                return Err(KnowledgeError::RequiredForbidden {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        self.forbidden_within.insert(tier);
        Ok(())
    }

    /// Require the directed edge `from → to`.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::RequiredForbidden`] if the edge is already
    /// forbidden, or [`KnowledgeError::SelfEdge`] for `from == to`.
    pub fn set_required(&mut self, from: &str, to: &str) -> Result<(), KnowledgeError> {
        if from == to {
            return Err(KnowledgeError::SelfEdge {
                name: from.to_string(),
            });
        }
        if self.is_forbidden(from, to) {
            return Err(KnowledgeError::RequiredForbidden {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.required.insert((from.to_string(), to.to_string()));
        Ok(())
    }

    /// Forbid the directed edge `from → to`.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::RequiredForbidden`] if the edge is required.
    pub fn set_forbidden(&mut self, from: &str, to: &str) -> Result<(), KnowledgeError> {
        if self.is_required(from, to) {
            return Err(KnowledgeError::RequiredForbidden {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.forbidden.insert((from.to_string(), to.to_string()));
        Ok(())
    }

    /// `true` if `from → to` may not appear in any output graph.
    #[must_use]
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        self.is_forbidden_by_tiers(from, to)
            || self
                .forbidden
                .contains(&(from.to_string(), to.to_string()))
    }

    /// `true` if tiers alone forbid `from → to`.
    #[must_use]
    pub fn is_forbidden_by_tiers(&self, from: &str, to: &str) -> bool {
        match (self.tier_index(from), self.tier_index(to)) {
            (Some(a), Some(b)) if a == b => self.forbidden_within.contains(&a),
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&(from.to_string(), to.to_string()))
    }

    /// `true` when no edge in either direction is required between `x` and `y`.
    #[must_use]
    pub fn no_edge_required(&self, x: &str, y: &str) -> bool {
        !(self.is_required(x, y) || self.is_required(y, x))
    }

    #[must_use]
    pub fn num_tiers(&self) -> usize {
        self.tiers.len()
    }

    /// Names in tier `tier`, in insertion order. Empty for unknown tiers.
    #[must_use]
    pub fn tier(&self, tier: usize) -> &[String] {
        self.tiers.get(tier).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn tier_index(&self, name: &str) -> Option<usize> {
        self.tier_of.get(name).copied()
    }

    #[must_use]
    pub fn is_tier_forbidden_within(&self, tier: usize) -> bool {
        self.forbidden_within.contains(&tier)
    }

    /// Names of `variables` that are not assigned to any tier.
    #[must_use]
    pub fn variables_not_in_tiers(&self, variables: &VariableSetV1) -> Vec<String> {
        variables
            .iter()
            .filter(|v| !self.tier_of.contains_key(&v.name))
            .map(|v| v.name.clone())
            .collect()
    }

    /// Explicitly required edges in sorted order.
    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// Explicitly forbidden edges in sorted order (tier constraints excluded).
    pub fn forbidden_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forbidden.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    /// `true` when no constraint of any kind is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty() && self.tier_of.is_empty()
    }

    /// Check every name against `variables` and every required edge against
    /// the final forbidden relation (tiers included).
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::UnknownVariable`] or
    /// [`KnowledgeError::RequiredForbidden`].
    pub fn validate(&self, variables: &VariableSetV1) -> Result<(), KnowledgeError> {
        let names = self
            .tier_of
            .keys()
            .map(String::as_str)
            .chain(self.required.iter().flat_map(|(a, b)| [a.as_str(), b.as_str()]))
            .chain(self.forbidden.iter().flat_map(|(a, b)| [a.as_str(), b.as_str()]));
        for name in names {
            if variables.index_of(name).is_none() {
                return Err(KnowledgeError::UnknownVariable {
                    name: name.to_string(),
                });
            }
        }
        for (from, to) in &self.required {
            if self.is_forbidden(from, to) {
                return Err(KnowledgeError::RequiredForbidden {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        Ok(())
    }

    /// JSON snapshot: tiers in order, edge lists and flags sorted.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let pairs = |set: &BTreeSet<(String, String)>| {
            set.iter().map(|(a, b)| vec![a.clone(), b.clone()]).collect::<Vec<_>>()
        };
        serde_json::json!({
            "forbidden": pairs(&self.forbidden),
            "forbidden_within": self.forbidden_within.iter().collect::<Vec<_>>(),
            "required": pairs(&self.required),
            "tiers": self.tiers,
        })
    }

    /// Content digest of [`Self::to_json_value`].
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json_value())?;
        Ok(canonical_hash(HashDomain::Knowledge, &bytes))
    }
}
