//! Anatomical regions used as the classification target for injury text.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};

/// Stable slug identifying a region (e.g. `left_ankle`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Wrap a region id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Diagram placement of a region. Only presentation layers read this.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutHint {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutHint {
    /// Diagram rectangle at (`x`, `y`) with the given size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A canonical body part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnatomicalRegion {
    pub id: RegionId,
    pub label: String,
    #[serde(default)]
    pub layout: LayoutHint,
}

impl AnatomicalRegion {
    /// Region with a diagram layout.
    pub fn new(id: impl Into<String>, label: impl Into<String>, layout: LayoutHint) -> Self {
        Self {
            id: RegionId::new(id),
            label: label.into(),
            layout,
        }
    }
}

/// (id, label, x, y, width, height) on a 240x440 body diagram.
const STANDARD_REGIONS: &[(&str, &str, f64, f64, f64, f64)] = &[
    ("head", "Head", 100.0, 30.0, 40.0, 40.0),
    ("neck", "Neck", 105.0, 70.0, 30.0, 20.0),
    ("left_shoulder", "Left Shoulder", 60.0, 90.0, 35.0, 25.0),
    ("right_shoulder", "Right Shoulder", 145.0, 90.0, 35.0, 25.0),
    ("chest", "Chest", 85.0, 95.0, 70.0, 40.0),
    ("left_arm", "Left Arm", 35.0, 115.0, 25.0, 60.0),
    ("right_arm", "Right Arm", 180.0, 115.0, 25.0, 60.0),
    ("left_elbow", "Left Elbow", 30.0, 145.0, 25.0, 25.0),
    ("right_elbow", "Right Elbow", 185.0, 145.0, 25.0, 25.0),
    ("left_forearm", "Left Forearm", 20.0, 170.0, 25.0, 50.0),
    ("right_forearm", "Right Forearm", 195.0, 170.0, 25.0, 50.0),
    ("left_wrist", "Left Wrist", 10.0, 220.0, 25.0, 20.0),
    ("right_wrist", "Right Wrist", 205.0, 220.0, 25.0, 20.0),
    ("left_hand", "Left Hand", 5.0, 240.0, 30.0, 35.0),
    ("right_hand", "Right Hand", 205.0, 240.0, 30.0, 35.0),
    ("abdomen", "Abdomen", 85.0, 135.0, 70.0, 40.0),
    ("lower_back", "Lower Back", 85.0, 175.0, 70.0, 30.0),
    ("hip", "Hip", 75.0, 205.0, 90.0, 30.0),
    ("left_thigh", "Left Thigh", 70.0, 235.0, 40.0, 60.0),
    ("right_thigh", "Right Thigh", 130.0, 235.0, 40.0, 60.0),
    ("left_knee", "Left Knee", 70.0, 295.0, 40.0, 30.0),
    ("right_knee", "Right Knee", 130.0, 295.0, 40.0, 30.0),
    ("left_shin", "Left Shin", 70.0, 325.0, 35.0, 50.0),
    ("right_shin", "Right Shin", 135.0, 325.0, 35.0, 50.0),
    ("left_ankle", "Left Ankle", 65.0, 375.0, 40.0, 25.0),
    ("right_ankle", "Right Ankle", 135.0, 375.0, 40.0, 25.0),
    ("left_foot", "Left Foot", 55.0, 400.0, 50.0, 25.0),
    ("right_foot", "Right Foot", 135.0, 400.0, 50.0, 25.0),
];

/// Ordered set of regions.
///
/// Insertion order is the canonical region order: per-region output follows
/// it and ranking ties are broken by it.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: IndexMap<RegionId, AnatomicalRegion>,
}

impl RegionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The 28-region body map.
    pub fn standard() -> Self {
        let regions = STANDARD_REGIONS
            .iter()
            .map(|&(id, label, x, y, width, height)| {
                let region = AnatomicalRegion::new(id, label, LayoutHint::new(x, y, width, height));
                (region.id.clone(), region)
            })
            .collect();
        Self { regions }
    }

    /// Append a region, rejecting ids that are already present.
    pub fn add(&mut self, region: AnatomicalRegion) -> Result<()> {
        if self.regions.contains_key(&region.id) {
            return Err(HeatmapError::DuplicateRegion {
                id: region.id.to_string(),
            });
        }
        self.regions.insert(region.id.clone(), region);
        Ok(())
    }

    /// Look up a region by id.
    pub fn get(&self, id: &str) -> Option<&AnatomicalRegion> {
        self.regions.get(id)
    }

    /// Whether `id` names a region in this catalog.
    pub fn contains(&self, id: &str) -> bool {
        self.regions.contains_key(id)
    }

    /// Human-readable label, falling back to the id itself.
    pub fn label_for<'a>(&'a self, id: &'a RegionId) -> &'a str {
        self.regions
            .get(id)
            .map(|r| r.label.as_str())
            .unwrap_or_else(|| id.as_str())
    }

    /// Position of a region in canonical order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.regions.get_index_of(id)
    }

    /// Regions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &AnatomicalRegion> {
        self.regions.values()
    }

    /// Region ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.keys()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the catalog has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_order() {
        let catalog = RegionCatalog::standard();
        assert_eq!(catalog.len(), 28);

        let ids: Vec<&str> = catalog.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"head"));
        assert_eq!(ids.last(), Some(&"right_foot"));
        assert_eq!(catalog.position("left_ankle"), Some(24));
    }

    #[test]
    fn test_label_lookup() {
        let catalog = RegionCatalog::standard();
        assert_eq!(catalog.label_for(&RegionId::from("lower_back")), "Lower Back");

        let unknown = RegionId::from("tail");
        assert_eq!(catalog.label_for(&unknown), "tail");
    }

    #[test]
    fn test_add_region() {
        let mut catalog = RegionCatalog::standard();
        catalog
            .add(AnatomicalRegion::new("upper_back", "Upper Back", LayoutHint::default()))
            .unwrap();
        assert!(catalog.contains("upper_back"));
        assert_eq!(catalog.position("upper_back"), Some(28));

        let result = catalog.add(AnatomicalRegion::new("head", "Head", LayoutHint::default()));
        assert!(matches!(result, Err(HeatmapError::DuplicateRegion { .. })));
    }

    #[test]
    fn test_region_id_serializes_as_string() {
        let id = RegionId::from("left_knee");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"left_knee\"");
    }
}
