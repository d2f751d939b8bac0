//! Plain-text rendering of an aggregation result.

use crate::heatmap::{AggregationResult, ColorBucket};

/// Width of a full proportional bar, in characters.
pub const BAR_WIDTH: usize = 20;

/// Render the frequency legend followed by the "most affected areas" list.
///
/// ```text
/// Injury Frequency: None | Low | Medium | High | Critical
///
/// Most Affected Areas
///  1. Left Ankle            2  ####################
///  2. Right Knee            1  ##########
/// ```
pub fn render_summary(result: &AggregationResult) -> String {
    let mut out = String::new();

    let legend: Vec<&str> = ColorBucket::legend().iter().map(|b| b.label()).collect();
    out.push_str(&format!("Injury Frequency: {}\n", legend.join(" | ")));
    out.push('\n');
    out.push_str("Most Affected Areas\n");

    if result.top_regions.is_empty() {
        out.push_str("No injury data available\n");
        return out;
    }

    let label_width = result
        .top_regions
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);

    for (index, region) in result.top_regions.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<width$}  {:>3}  {}\n",
            index + 1,
            region.label,
            region.count,
            render_bar(region.bar_percent),
            width = label_width
        ));
    }

    if !result.unmatched.is_empty() {
        out.push('\n');
        out.push_str(&format!(
            "{} of {} records matched no body region\n",
            result.unmatched.len(),
            result.records_processed
        ));
    }

    out
}

/// A bar of `#` proportional to `percent` (clamped to 0..=100).
pub fn render_bar(percent: f64) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::{HeatmapAggregator, InjuryLocationRecord};

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(100.0), "#".repeat(BAR_WIDTH));
        assert_eq!(render_bar(50.0), "#".repeat(BAR_WIDTH / 2));
        assert_eq!(render_bar(0.0), "");
        assert_eq!(render_bar(250.0).len(), BAR_WIDTH);
    }

    #[test]
    fn test_render_summary() {
        let records = vec![
            InjuryLocationRecord::new("1", "left ankle"),
            InjuryLocationRecord::new("2", "left ankle"),
            InjuryLocationRecord::new("3", "right knee"),
            InjuryLocationRecord::new("4", "unknown xyz"),
        ];
        let result = HeatmapAggregator::standard().aggregate(&records);
        let text = render_summary(&result);

        assert!(text.starts_with("Injury Frequency: None | Low | Medium | High | Critical"));
        assert!(text.contains(" 1. Left Ankle    2  ####################"));
        assert!(text.contains(" 2. Right Knee    1  ##########"));
        assert!(text.contains("1 of 4 records matched no body region"));
    }

    #[test]
    fn test_render_summary_layout() {
        let records = vec![InjuryLocationRecord::new("1", "neck")];
        let result = HeatmapAggregator::standard().aggregate(&records);

        assert_eq!(
            render_summary(&result),
            "Injury Frequency: None | Low | Medium | High | Critical\n\
             \n\
             Most Affected Areas\n \
             1. Neck    1  ####################\n"
        );
    }

    #[test]
    fn test_render_summary_empty() {
        let empty: Vec<InjuryLocationRecord> = Vec::new();
        let result = HeatmapAggregator::standard().aggregate(&empty);
        let text = render_summary(&result);
        assert!(text.contains("No injury data available"));
    }
}
