//! Configuration for building a normalizer.
//!
//! Deployers extend the vocabulary with a JSON synonym document:
//!
//! ```json
//! {
//!   "version": "club-2024",
//!   "regions": [{ "id": "upper_back", "label": "Upper Back" }],
//!   "synonyms": {
//!     "acl": ["left_knee", "right_knee"],
//!     "upper back": ["upper_back"]
//!   }
//! }
//! ```
//!
//! By default the document is layered on top of the built-in table; with
//! [`TableMode::Replace`] it stands alone.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HeatmapError, Result};
use crate::normalizer::{LocationNormalizer, MatchPolicy};
use crate::regions::{AnatomicalRegion, RegionCatalog};
use crate::synonyms::SynonymTable;

/// Serialized form of a synonym table plus optional extra regions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynonymDocument {
    #[serde(default)]
    pub version: Option<String>,
    /// Regions appended to the standard catalog.
    #[serde(default)]
    pub regions: Vec<AnatomicalRegion>,
    #[serde(default)]
    pub synonyms: IndexMap<String, Vec<String>>,
}

impl SynonymDocument {
    /// Parse a synonym document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a synonym document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Build a table from the document's synonyms (without validation).
    pub fn to_table(&self) -> Result<SynonymTable> {
        let version = self.version.clone().unwrap_or_else(|| "custom".to_string());
        let mut table = SynonymTable::new(version);
        for (key, regions) in &self.synonyms {
            table.insert(key, regions.iter().map(String::as_str))?;
        }
        Ok(table)
    }
}

/// Whether a synonym document extends or replaces the built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    #[default]
    Merge,
    Replace,
}

/// Normalizer configuration.
#[derive(Debug, Clone, Default)]
pub struct HeatmapConfig {
    /// Optional synonym document to load.
    pub synonyms_path: Option<PathBuf>,
    pub table_mode: TableMode,
    pub match_policy: MatchPolicy,
}

impl HeatmapConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `INJURY_HEATMAP_SYNONYMS` | Path to a synonym document | (none) |
    /// | `INJURY_HEATMAP_REPLACE_SYNONYMS` | Replace instead of merge | `false` |
    /// | `INJURY_HEATMAP_WORD_BOUNDARY` | Whole-word substring matching | `false` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let synonyms_path = lookup("INJURY_HEATMAP_SYNONYMS")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let table_mode = if parse_flag(&lookup, "INJURY_HEATMAP_REPLACE_SYNONYMS")? {
            TableMode::Replace
        } else {
            TableMode::Merge
        };

        let match_policy = if parse_flag(&lookup, "INJURY_HEATMAP_WORD_BOUNDARY")? {
            MatchPolicy::WordBoundary
        } else {
            MatchPolicy::Substring
        };

        Ok(Self {
            synonyms_path,
            table_mode,
            match_policy,
        })
    }

    /// Build a validated normalizer from this configuration.
    pub fn build_normalizer(&self) -> Result<LocationNormalizer> {
        let document = match &self.synonyms_path {
            Some(path) => {
                info!("Loading synonym document from {}", path.display());
                Some(SynonymDocument::from_path(path)?)
            }
            None => None,
        };
        build_normalizer(document.as_ref(), self.table_mode, self.match_policy)
    }
}

/// Assemble catalog and table from an optional document and validate them.
pub fn build_normalizer(
    document: Option<&SynonymDocument>,
    mode: TableMode,
    policy: MatchPolicy,
) -> Result<LocationNormalizer> {
    let mut catalog = RegionCatalog::standard();
    let table = match document {
        Some(document) => {
            for region in &document.regions {
                catalog.add(region.clone())?;
            }
            let custom = document.to_table()?;
            match mode {
                TableMode::Replace => custom,
                TableMode::Merge => {
                    let mut table = SynonymTable::standard();
                    table.merge(custom);
                    table
                }
            }
        }
        None => SynonymTable::standard(),
    };

    info!(
        "Synonym table {} ready: {} entries over {} regions",
        table.version(),
        table.len(),
        catalog.len()
    );
    Ok(LocationNormalizer::new(Arc::new(catalog), Arc::new(table))?.with_policy(policy))
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(false),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            other => Err(HeatmapError::InvalidConfig(format!(
                "{} must be a boolean, got '{}'",
                key, other
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CLUB_DOCUMENT: &str = r#"{
        "version": "club-2024",
        "regions": [{ "id": "upper_back", "label": "Upper Back" }],
        "synonyms": {
            "acl": ["left_knee", "right_knee"],
            "upper back": ["upper_back"],
            "trap": ["upper_back", "neck"]
        }
    }"#;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = HeatmapConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.synonyms_path.is_none());
        assert_eq!(config.table_mode, TableMode::Merge);
        assert_eq!(config.match_policy, MatchPolicy::Substring);
    }

    #[test]
    fn test_from_lookup_values() {
        let config = HeatmapConfig::from_lookup(lookup_from(&[
            ("INJURY_HEATMAP_SYNONYMS", "/etc/heatmap/synonyms.json"),
            ("INJURY_HEATMAP_REPLACE_SYNONYMS", "yes"),
            ("INJURY_HEATMAP_WORD_BOUNDARY", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(
            config.synonyms_path,
            Some(PathBuf::from("/etc/heatmap/synonyms.json"))
        );
        assert_eq!(config.table_mode, TableMode::Replace);
        assert_eq!(config.match_policy, MatchPolicy::WordBoundary);
    }

    #[test]
    fn test_from_lookup_invalid_flag() {
        let result = HeatmapConfig::from_lookup(lookup_from(&[(
            "INJURY_HEATMAP_WORD_BOUNDARY",
            "maybe",
        )]));
        assert!(matches!(result, Err(HeatmapError::InvalidConfig(_))));
    }

    #[test]
    fn test_merge_document() {
        let document = SynonymDocument::from_json_str(CLUB_DOCUMENT).unwrap();
        let normalizer =
            build_normalizer(Some(&document), TableMode::Merge, MatchPolicy::Substring).unwrap();

        assert_eq!(normalizer.catalog().len(), 29);
        assert!(normalizer.normalize("torn ACL").contains("left_knee"));
        assert!(normalizer.normalize("upper back").contains("upper_back"));
        // Built-in terms survive a merge
        assert!(normalizer.normalize("left ankle").contains("left_ankle"));
        assert_eq!(normalizer.table().version(), "standard-1+club-2024");
    }

    #[test]
    fn test_replace_document() {
        let document = SynonymDocument::from_json_str(CLUB_DOCUMENT).unwrap();
        let normalizer =
            build_normalizer(Some(&document), TableMode::Replace, MatchPolicy::Substring).unwrap();

        assert_eq!(normalizer.table().len(), 3);
        assert!(normalizer.normalize("left ankle").is_empty());
    }

    #[test]
    fn test_document_with_unknown_region_is_rejected() {
        let document = SynonymDocument::from_json_str(
            r#"{ "synonyms": { "tailbone": ["coccyx"] } }"#,
        )
        .unwrap();
        let result = build_normalizer(Some(&document), TableMode::Merge, MatchPolicy::Substring);
        assert!(matches!(result, Err(HeatmapError::UnknownRegion { .. })));
    }

    #[test]
    fn test_document_with_duplicate_region_is_rejected() {
        let document = SynonymDocument::from_json_str(
            r#"{ "regions": [{ "id": "head", "label": "Head" }] }"#,
        )
        .unwrap();
        let result = build_normalizer(Some(&document), TableMode::Merge, MatchPolicy::Substring);
        assert!(matches!(result, Err(HeatmapError::DuplicateRegion { .. })));
    }

    #[test]
    fn test_build_from_path() {
        let path = env::temp_dir().join(format!(
            "injury-heatmap-synonyms-{}.json",
            std::process::id()
        ));
        fs::write(&path, CLUB_DOCUMENT).unwrap();

        let config = HeatmapConfig {
            synonyms_path: Some(path.clone()),
            ..Default::default()
        };
        let normalizer = config.build_normalizer().unwrap();
        fs::remove_file(&path).unwrap();

        assert!(normalizer.normalize("sore trap").contains("neck"));
    }

    #[test]
    fn test_missing_file() {
        let config = HeatmapConfig {
            synonyms_path: Some(PathBuf::from("/nonexistent/synonyms.json")),
            ..Default::default()
        };
        assert!(matches!(
            config.build_normalizer(),
            Err(HeatmapError::Io(_))
        ));
    }
}
