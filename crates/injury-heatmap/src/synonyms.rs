//! Synonym table mapping free-text phrases onto catalog regions.
//!
//! Keys are lowercase and may contain spaces. Colloquial terms, typos and
//! no-space variants are separate keys. A key may expand to several regions
//! (unqualified terms such as "knee" cover both sides) and several keys may
//! share a region.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{HeatmapError, Result};
use crate::regions::{RegionCatalog, RegionId};

/// Version tag of the built-in table.
pub const STANDARD_TABLE_VERSION: &str = "standard-1";

const STANDARD_SYNONYMS: &[(&str, &[&str])] = &[
    // Head & neck
    ("head", &["head"]),
    ("skull", &["head"]),
    ("face", &["head"]),
    ("neck", &["neck"]),
    ("cervical", &["neck"]),
    // Shoulders
    ("shoulder", &["left_shoulder", "right_shoulder"]),
    ("leftshoulder", &["left_shoulder"]),
    ("left shoulder", &["left_shoulder"]),
    ("rightshoulder", &["right_shoulder"]),
    ("right shoulder", &["right_shoulder"]),
    // Chest & core
    ("chest", &["chest"]),
    ("thorax", &["chest"]),
    ("rib", &["chest"]),
    ("abdomen", &["abdomen"]),
    ("stomach", &["abdomen"]),
    ("core", &["abdomen"]),
    // Arms
    ("arm", &["left_arm", "right_arm"]),
    ("leftarm", &["left_arm"]),
    ("left arm", &["left_arm"]),
    ("rightarm", &["right_arm"]),
    ("right arm", &["right_arm"]),
    ("upper arm", &["left_arm", "right_arm"]),
    ("upperarm", &["left_arm", "right_arm"]),
    ("bicep", &["left_arm", "right_arm"]),
    // Elbows
    ("elbow", &["left_elbow", "right_elbow"]),
    ("leftelbow", &["left_elbow"]),
    ("left elbow", &["left_elbow"]),
    ("rightelbow", &["right_elbow"]),
    ("right elbow", &["right_elbow"]),
    // Forearms
    ("forearm", &["left_forearm", "right_forearm"]),
    ("leftforearm", &["left_forearm"]),
    ("left forearm", &["left_forearm"]),
    ("rightforearm", &["right_forearm"]),
    ("right forearm", &["right_forearm"]),
    // Wrists
    ("wrist", &["left_wrist", "right_wrist"]),
    ("leftwrist", &["left_wrist"]),
    ("left wrist", &["left_wrist"]),
    ("rightwrist", &["right_wrist"]),
    ("right wrist", &["right_wrist"]),
    // Hands
    ("hand", &["left_hand", "right_hand"]),
    ("lefthand", &["left_hand"]),
    ("left hand", &["left_hand"]),
    ("righthand", &["right_hand"]),
    ("right hand", &["right_hand"]),
    ("finger", &["left_hand", "right_hand"]),
    // Back & hip
    ("back", &["lower_back"]),
    ("lowerback", &["lower_back"]),
    ("lower back", &["lower_back"]),
    ("lumbar", &["lower_back"]),
    ("spine", &["lower_back", "neck"]),
    ("hip", &["hip"]),
    ("pelvis", &["hip"]),
    ("groin", &["hip"]),
    // Thighs
    ("thigh", &["left_thigh", "right_thigh"]),
    ("leftthigh", &["left_thigh"]),
    ("left thigh", &["left_thigh"]),
    ("rightthigh", &["right_thigh"]),
    ("right thigh", &["right_thigh"]),
    ("quadricep", &["left_thigh", "right_thigh"]),
    ("quad", &["left_thigh", "right_thigh"]),
    ("hamstring", &["left_thigh", "right_thigh"]),
    // Knees
    ("knee", &["left_knee", "right_knee"]),
    ("leftknee", &["left_knee"]),
    ("left knee", &["left_knee"]),
    ("rightknee", &["right_knee"]),
    ("right knee", &["right_knee"]),
    // Shins & calves
    ("shin", &["left_shin", "right_shin"]),
    ("leftshin", &["left_shin"]),
    ("left shin", &["left_shin"]),
    ("rightshin", &["right_shin"]),
    ("right shin", &["right_shin"]),
    ("calf", &["left_shin", "right_shin"]),
    ("leftcalf", &["left_shin"]),
    ("rightcalf", &["right_shin"]),
    // Legs (general)
    ("leg", &["left_thigh", "right_thigh", "left_shin", "right_shin"]),
    ("leftleg", &["left_thigh", "left_shin"]),
    ("left leg", &["left_thigh", "left_shin"]),
    ("rightleg", &["right_thigh", "right_shin"]),
    ("right leg", &["right_thigh", "right_shin"]),
    // Ankles, including common misspellings
    ("ankle", &["left_ankle", "right_ankle"]),
    ("ancle", &["left_ankle", "right_ankle"]),
    ("leftankle", &["left_ankle"]),
    ("left ankle", &["left_ankle"]),
    ("leftancle", &["left_ankle"]),
    ("rightankle", &["right_ankle"]),
    ("right ankle", &["right_ankle"]),
    ("rightancle", &["right_ankle"]),
    ("achilles", &["left_ankle", "right_ankle"]),
    // Feet
    ("foot", &["left_foot", "right_foot"]),
    ("feet", &["left_foot", "right_foot"]),
    ("leftfoot", &["left_foot"]),
    ("left foot", &["left_foot"]),
    ("rightfoot", &["right_foot"]),
    ("right foot", &["right_foot"]),
    ("toe", &["left_foot", "right_foot"]),
    // Body (general)
    ("body", &["chest", "abdomen"]),
];

/// Versioned mapping from lowercase phrases to region ids.
///
/// Key order is preserved, so substring-phase results are reproducible.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    version: String,
    entries: IndexMap<String, Vec<RegionId>>,
}

impl SynonymTable {
    /// Create an empty table with the given version tag.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            entries: IndexMap::new(),
        }
    }

    /// The built-in table covering the standard catalog.
    pub fn standard() -> Self {
        let entries = STANDARD_SYNONYMS
            .iter()
            .map(|&(key, regions)| {
                let regions = regions.iter().map(|&id| RegionId::from(id)).collect();
                (key.to_string(), regions)
            })
            .collect();
        Self {
            version: STANDARD_TABLE_VERSION.to_string(),
            entries,
        }
    }

    /// Insert or replace a synonym.
    ///
    /// The key is trimmed and lowercased; duplicate region ids are dropped
    /// while keeping first-seen order.
    pub fn insert<I, R>(&mut self, key: &str, regions: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<RegionId>,
    {
        let key = normalize_key(key);
        if key.is_empty() {
            return Err(HeatmapError::EmptyKey);
        }

        let mut ids: Vec<RegionId> = Vec::new();
        for region in regions {
            let region = region.into();
            if !ids.contains(&region) {
                ids.push(region);
            }
        }
        if ids.is_empty() {
            return Err(HeatmapError::EmptyRegions { key });
        }

        self.entries.insert(key, ids);
        Ok(())
    }

    /// Layer another table on top of this one.
    ///
    /// Keys already present are overwritten in place; new keys are appended.
    pub fn merge(&mut self, other: SynonymTable) {
        debug!(
            "Merging synonym table {} ({} entries) into {}",
            other.version,
            other.entries.len(),
            self.version
        );
        self.version = format!("{}+{}", self.version, other.version);
        self.entries.extend(other.entries);
    }

    /// Check that every referenced region exists in the catalog.
    pub fn validate(&self, catalog: &RegionCatalog) -> Result<()> {
        for (key, regions) in &self.entries {
            if let Some(missing) = regions.iter().find(|id| !catalog.contains(id.as_str())) {
                return Err(HeatmapError::UnknownRegion {
                    key: key.clone(),
                    region: missing.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Regions for an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&[RegionId]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RegionId])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Version tag, e.g. `standard-1` or `standard-1+club`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lowercase and trim free text the same way keys are stored.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
