//! Heatmap aggregation over normalized injury locations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::normalizer::{LocationClassifier, LocationNormalizer};
use crate::regions::{RegionCatalog, RegionId};

/// Maximum number of entries in [`AggregationResult::top_regions`].
pub const TOP_REGION_LIMIT: usize = 5;

/// Opacity of regions with no injuries.
pub const EMPTY_REGION_OPACITY: f64 = 0.3;

/// One injury row as stored by the dashboard backend.
///
/// Only `id` and `body_location` are read; other columns are ignored when
/// deserializing. A missing or `null` location is treated as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryLocationRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub body_location: Option<String>,
}

impl InjuryLocationRecord {
    pub fn new(id: impl Into<String>, body_location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body_location: Some(body_location.into()),
        }
    }

    /// Location text, empty when the column is missing or `null`.
    pub fn location_text(&self) -> &str {
        self.body_location.as_deref().unwrap_or("")
    }
}

/// A record whose location matched no region, with the text that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedRecord {
    pub id: String,
    pub body_location: String,
}

/// Five-level heat classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl ColorBucket {
    /// Classify a count against the dataset maximum.
    ///
    /// Upper bounds are inclusive: intensity 0.25 is `Low`, 0.5 is `Medium`,
    /// 0.75 is `High`.
    pub fn classify(count: u32, intensity: f64) -> Self {
        if count == 0 {
            Self::None
        } else if intensity <= 0.25 {
            Self::Low
        } else if intensity <= 0.5 {
            Self::Medium
        } else if intensity <= 0.75 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// All buckets from coolest to hottest.
    pub fn legend() -> [Self; 5] {
        [Self::None, Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    /// Serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Theme palette token used to paint the bucket on the body diagram.
    pub fn theme_token(&self) -> &'static str {
        match self {
            Self::None => "muted",
            Self::Low => "success",
            Self::Medium => "warning",
            Self::High => "danger",
            Self::Critical => "destructive",
        }
    }
}

/// Derived heat values for one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionHeat {
    pub count: u32,
    /// `count / max_count`, in `[0, 1]`.
    pub intensity: f64,
    pub color_bucket: ColorBucket,
    pub opacity: f64,
}

impl RegionHeat {
    fn new(count: u32, max_count: u32) -> Self {
        let intensity = if count == 0 {
            0.0
        } else {
            f64::from(count) / f64::from(max_count)
        };
        let opacity = if count == 0 {
            EMPTY_REGION_OPACITY
        } else {
            0.4 + intensity * 0.6
        };
        Self {
            count,
            intensity,
            color_bucket: ColorBucket::classify(count, intensity),
            opacity,
        }
    }
}

/// An entry in the "most affected areas" list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRegion {
    pub region_id: RegionId,
    pub label: String,
    pub count: u32,
    /// Bar width relative to the busiest region, in percent.
    pub bar_percent: f64,
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Regions with at least one match, in catalog order.
    pub region_counts: IndexMap<RegionId, u32>,
    /// Highest count, never below 1.
    pub max_count: u32,
    /// Every catalog region, in catalog order.
    pub per_region: IndexMap<RegionId, RegionHeat>,
    /// Up to [`TOP_REGION_LIMIT`] regions by count, ties in catalog order.
    pub top_regions: Vec<RankedRegion>,
    pub records_processed: usize,
    /// Sum of all counts. Exceeds `records_processed` when records fan out.
    pub total_matches: u32,
    /// Records whose location matched no region, in input order.
    pub unmatched: Vec<UnmatchedRecord>,
}

impl AggregationResult {
    /// Count for a region, 0 when it had no matches.
    pub fn count(&self, id: &str) -> u32 {
        self.region_counts.get(id).copied().unwrap_or(0)
    }

    /// Heat values for a region, `None` for ids outside the catalog.
    pub fn heat(&self, id: &str) -> Option<&RegionHeat> {
        self.per_region.get(id)
    }

    /// Whether no record matched any region.
    pub fn is_empty(&self) -> bool {
        self.region_counts.is_empty()
    }
}

/// Turns injury records into region counts, heat values and a ranking.
#[derive(Debug, Clone)]
pub struct HeatmapAggregator<C = LocationNormalizer> {
    classifier: C,
}

impl HeatmapAggregator<LocationNormalizer> {
    /// Aggregator over the built-in catalog and synonym table.
    pub fn standard() -> Self {
        Self::new(LocationNormalizer::standard())
    }
}

impl Default for HeatmapAggregator<LocationNormalizer> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<C: LocationClassifier> HeatmapAggregator<C> {
    /// Aggregator over a custom classifier, e.g. a [`crate::CachedNormalizer`].
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// The classifier records are run through.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Aggregate a sequence of records. Never fails; unmatched records are
    /// listed in [`AggregationResult::unmatched`].
    pub fn aggregate<'a, I>(&self, records: I) -> AggregationResult
    where
        I: IntoIterator<Item = &'a InjuryLocationRecord>,
    {
        let catalog = self.classifier.catalog();
        // Indexed by catalog position so iteration order never depends on hashing.
        let mut counts = vec![0u32; catalog.len()];
        let mut records_processed = 0usize;
        let mut unmatched = Vec::new();

        for record in records {
            records_processed += 1;
            let regions = self.classifier.classify(record.location_text());
            if regions.is_empty() {
                unmatched.push(UnmatchedRecord {
                    id: record.id.clone(),
                    body_location: record.location_text().to_string(),
                });
                continue;
            }
            for id in regions.iter() {
                if let Some(position) = catalog.position(id.as_str()) {
                    counts[position] += 1;
                }
            }
        }

        let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
        let total_matches = counts.iter().sum();

        let region_counts = catalog
            .ids()
            .zip(&counts)
            .filter(|&(_, &count)| count > 0)
            .map(|(id, &count)| (id.clone(), count))
            .collect();

        let per_region = catalog
            .ids()
            .zip(&counts)
            .map(|(id, &count)| (id.clone(), RegionHeat::new(count, max_count)))
            .collect();

        let top_regions = rank_regions(catalog, &counts, max_count);

        AggregationResult {
            region_counts,
            max_count,
            per_region,
            top_regions,
            records_processed,
            total_matches,
            unmatched,
        }
    }
}

/// Top regions by count; the sort is stable over catalog order.
fn rank_regions(catalog: &RegionCatalog, counts: &[u32], max_count: u32) -> Vec<RankedRegion> {
    let mut ranked: Vec<(&RegionId, u32)> = catalog
        .ids()
        .zip(counts.iter().copied())
        .filter(|&(_, count)| count > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(TOP_REGION_LIMIT)
        .map(|(id, count)| RankedRegion {
            region_id: id.clone(),
            label: catalog.label_for(id).to_string(),
            count,
            bar_percent: f64::from(count) / f64::from(max_count) * 100.0,
        })
        .collect()
}
