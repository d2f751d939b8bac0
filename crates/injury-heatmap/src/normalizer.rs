//! Free-text body location normalization.
//!
//! Matching runs in two phases:
//!
//! 1. **Exact**: the lowercased, trimmed input is looked up as a key. A hit
//!    returns that key's regions and stops.
//! 2. **Substring**: every key is tested for containment in both directions
//!    (input contains key, or key contains input). Regions of all matching
//!    keys are unioned.
//!
//! Substring matching is deliberately loose: `"hipster"` contains `"hip"`.
//! [`MatchPolicy::WordBoundary`] tightens the input-contains-key direction
//! for callers that prefer fewer false positives.

use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::regions::{RegionCatalog, RegionId};
use crate::synonyms::{normalize_key, SynonymTable};

/// Deduplicated set of regions returned by normalization.
///
/// Iterates in first-match order; equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegionSet(IndexSet<RegionId>);

impl RegionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region. Returns `false` if it was already present.
    pub fn insert(&mut self, id: RegionId) -> bool {
        self.0.insert(id)
    }

    /// Whether the set holds `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Regions in first-match order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionId> {
        self.0.iter()
    }

    /// Number of distinct regions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no region matched.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<R: Into<RegionId>> FromIterator<R> for RegionSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl Extend<RegionId> for RegionSet {
    fn extend<I: IntoIterator<Item = RegionId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for RegionSet {
    type Item = RegionId;
    type IntoIter = indexmap::set::IntoIter<RegionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a RegionId;
    type IntoIter = indexmap::set::Iter<'a, RegionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// How the substring phase decides that the input contains a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Plain containment anywhere in the input.
    #[default]
    Substring,
    /// The key must appear as a whole word (bounded by non-alphanumeric
    /// characters or the ends of the input).
    WordBoundary,
}

/// Maps free text onto catalog regions.
///
/// Implementations must be total: unmatched text yields an empty set, never
/// an error, and every returned id must exist in [`catalog`](Self::catalog).
pub trait LocationClassifier: Send + Sync {
    /// Classify one free-text location.
    fn classify(&self, text: &str) -> RegionSet;

    /// The catalog results are drawn from.
    fn catalog(&self) -> &RegionCatalog;
}

/// Two-phase synonym matcher over a validated table.
#[derive(Debug, Clone)]
pub struct LocationNormalizer {
    catalog: Arc<RegionCatalog>,
    table: Arc<SynonymTable>,
    policy: MatchPolicy,
}

impl LocationNormalizer {
    /// Build a normalizer, rejecting tables that reference unknown regions.
    pub fn new(catalog: Arc<RegionCatalog>, table: Arc<SynonymTable>) -> Result<Self> {
        table.validate(&catalog)?;
        debug!(
            "Built normalizer: {} regions, {} synonyms (table {})",
            catalog.len(),
            table.len(),
            table.version()
        );
        Ok(Self {
            catalog,
            table,
            policy: MatchPolicy::default(),
        })
    }

    /// Normalizer over the built-in catalog and synonym table.
    pub fn standard() -> Self {
        // The built-in table is checked against the built-in catalog in tests.
        Self {
            catalog: Arc::new(RegionCatalog::standard()),
            table: Arc::new(SynonymTable::standard()),
            policy: MatchPolicy::default(),
        }
    }

    /// Set the substring-phase policy.
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Active matching policy.
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Synonym table in use.
    pub fn table(&self) -> &SynonymTable {
        &self.table
    }

    /// Catalog the table is validated against.
    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Map free text onto zero or more regions.
    pub fn normalize(&self, text: &str) -> RegionSet {
        let input = normalize_key(text);
        if input.is_empty() {
            return RegionSet::new();
        }

        if let Some(regions) = self.table.get(&input) {
            return regions.iter().cloned().collect();
        }

        let mut matches = RegionSet::new();
        for (key, regions) in self.table.iter() {
            if self.input_contains(&input, key) || key.contains(input.as_str()) {
                matches.extend(regions.iter().cloned());
            }
        }
        matches
    }

    fn input_contains(&self, input: &str, key: &str) -> bool {
        match self.policy {
            MatchPolicy::Substring => input.contains(key),
            MatchPolicy::WordBoundary => contains_word(input, key),
        }
    }
}

impl Default for LocationNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}

impl LocationClassifier for LocationNormalizer {
    fn classify(&self, text: &str) -> RegionSet {
        self.normalize(text)
    }

    fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }
}

/// Whether `needle` occurs in `haystack` with no alphanumeric neighbours.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
