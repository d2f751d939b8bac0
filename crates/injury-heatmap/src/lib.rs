//! Body-location normalization and injury heatmap aggregation.
//!
//! Injury records carry a free-text `body_location` typed by staff ("L ankle
//! sprain", "hamstring", "leftancle"). This crate maps that text onto a fixed
//! anatomical catalog and aggregates the result into a heatmap:
//!
//! - [`LocationNormalizer`] - exact-then-substring matching against a
//!   versioned [`SynonymTable`].
//! - [`CachedNormalizer`] - the same, memoized per distinct input.
//! - [`HeatmapAggregator`] - per-region counts, intensity, color bucket,
//!   opacity and the top five most affected regions.
//! - [`report::render_summary`] - plain-text legend and ranking.
//!
//! # Example
//!
//! ```rust
//! use injury_heatmap::{ColorBucket, HeatmapAggregator, InjuryLocationRecord};
//!
//! let records = vec![
//!     InjuryLocationRecord::new("inj-1", "left ankle"),
//!     InjuryLocationRecord::new("inj-2", "Left Ankle"),
//!     InjuryLocationRecord::new("inj-3", "right knee"),
//! ];
//!
//! let result = HeatmapAggregator::standard().aggregate(&records);
//! assert_eq!(result.max_count, 2);
//! assert_eq!(result.heat("right_knee").unwrap().color_bucket, ColorBucket::Medium);
//! assert_eq!(result.top_regions[0].label, "Left Ankle");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod heatmap;
pub mod normalizer;
pub mod regions;
pub mod report;
pub mod synonyms;

pub use cache::{CachedNormalizer, DEFAULT_MAX_ENTRIES};
pub use config::{build_normalizer, HeatmapConfig, SynonymDocument, TableMode};
pub use error::{HeatmapError, Result};
pub use heatmap::{
    AggregationResult, ColorBucket, HeatmapAggregator, InjuryLocationRecord, RankedRegion,
    RegionHeat, UnmatchedRecord, TOP_REGION_LIMIT,
};
pub use normalizer::{LocationClassifier, LocationNormalizer, MatchPolicy, RegionSet};
pub use regions::{AnatomicalRegion, LayoutHint, RegionCatalog, RegionId};
pub use synonyms::{SynonymTable, STANDARD_TABLE_VERSION};
