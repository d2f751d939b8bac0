use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use injury_heatmap::report::render_summary;
use injury_heatmap::{
    CachedNormalizer, HeatmapAggregator, HeatmapConfig, InjuryLocationRecord, MatchPolicy,
    TableMode,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "injury-heatmap")]
#[command(about = "Aggregate free-text injury locations into a body heatmap")]
struct Args {
    /// JSON array of injury rows (reads stdin when omitted or "-")
    #[arg(long)]
    input: Option<PathBuf>,

    /// Synonym document to load. Falls back to INJURY_HEATMAP_SYNONYMS env.
    #[arg(long)]
    synonyms: Option<PathBuf>,

    /// Use the synonym document instead of merging it into the built-in table
    #[arg(long)]
    replace_synonyms: bool,

    /// Only match synonyms on whole words
    #[arg(long)]
    word_boundary: bool,

    /// Output format. Falls back to INJURY_HEATMAP_FORMAT env (default: text).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = HeatmapConfig::from_env()?;
    if let Some(path) = args.synonyms.clone() {
        config.synonyms_path = Some(path);
    }
    if args.replace_synonyms {
        config.table_mode = TableMode::Replace;
    }
    if args.word_boundary {
        config.match_policy = MatchPolicy::WordBoundary;
    }
    let format = match args.format {
        Some(format) => format,
        None => format_from_env()?,
    };

    let normalizer = config.build_normalizer()?;
    let aggregator = HeatmapAggregator::new(CachedNormalizer::new(normalizer));

    let records = read_records(args.input.as_ref())?;
    info!(records = records.len(), "Aggregating injury locations");

    let result = aggregator.aggregate(&records);

    for miss in &result.unmatched {
        warn!(
            record_id = %miss.id,
            location = %miss.body_location,
            "Location matched no body region"
        );
    }
    info!(
        matches = result.total_matches,
        unmatched = result.unmatched.len(),
        cached_inputs = aggregator.classifier().cached_entries(),
        "Aggregation complete"
    );

    match format {
        OutputFormat::Text => print!("{}", render_summary(&result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

fn read_records(
    input: Option<&PathBuf>,
) -> Result<Vec<InjuryLocationRecord>, Box<dyn std::error::Error>> {
    let raw = match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

fn format_from_env() -> Result<OutputFormat, Box<dyn std::error::Error>> {
    match env::var("INJURY_HEATMAP_FORMAT") {
        Ok(value) => OutputFormat::from_str(value.trim(), true).map_err(|_| {
            let message = format!(
                "INJURY_HEATMAP_FORMAT must be 'text' or 'json', got '{}'",
                value
            );
            Box::<dyn std::error::Error>::from(message)
        }),
        Err(_) => Ok(OutputFormat::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "injury-heatmap",
            "--input",
            "injuries.json",
            "--word-boundary",
            "--format",
            "json",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("injuries.json")));
        assert!(args.word_boundary);
        assert!(!args.replace_synonyms);
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_read_records_from_file() {
        let path = env::temp_dir().join(format!(
            "injury-heatmap-records-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"[{"id": "a", "body_location": "left knee", "athlete_id": "x"}]"#,
        )
        .unwrap();

        let records = read_records(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location_text(), "left knee");
    }

    #[test]
    fn test_unmatched_rows_without_ids() {
        let path = env::temp_dir().join(format!(
            "injury-heatmap-no-ids-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"[{"body_location": "left knee"}, {"body_location": "gibberish xyz"}]"#,
        )
        .unwrap();

        let records = read_records(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        let result = HeatmapAggregator::standard().aggregate(&records);
        assert_eq!(result.unmatched.len(), 1);
        assert_eq!(result.unmatched[0].id, "");
        assert_eq!(result.unmatched[0].body_location, "gibberish xyz");
    }
}
