//! CLI for the tails VaR tail analysis engine.
//!
//! Reads a wide risk-node CSV extract (one `Node` column plus one column per
//! P&L vector), runs the aggregation and tail pipeline for the requested
//! methodologies, and prints the tail-comparison and top-changes tables.
//! The production node ids and vector ranges live here as defaults, not in
//! the engine; a JSON configuration file overrides them.

use clap::{Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process;
use tails::{
    AssetClass, DEFAULT_TAIL_N, EngineConfig, Methodology, Period, ScenarioCalendar,
    ScenarioRanges, aggregate, change_frame, compare_tails, records_from_frame, select_tails,
    tail_frame, top_changes,
};

#[derive(Parser)]
#[command(name = "tails")]
#[command(about = "VaR tail aggregation and ranking", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run tail and change analysis over a CSV extract
    Report {
        /// Path to the wide CSV extract (Node column + pnl_vector columns)
        input: PathBuf,
        /// JSON configuration file; defaults to the standard desk setup
        #[arg(long)]
        config: Option<PathBuf>,
        /// Scenario-to-date mapping file (JSON, keyed by period)
        #[arg(long)]
        dates: Option<PathBuf>,
        /// Methodology to report on
        #[arg(long, value_enum, default_value_t = MethodologyArg::Both)]
        methodology: MethodologyArg,
        /// Override the configured tail size
        #[arg(long)]
        tail_n: Option<usize>,
    },
    /// Print the default configuration as JSON
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MethodologyArg {
    Dvar,
    Svar,
    Both,
}

impl MethodologyArg {
    fn selected(self) -> &'static [Methodology] {
        match self {
            Self::Dvar => &[Methodology::DVaR],
            Self::Svar => &[Methodology::SVaR],
            Self::Both => &[Methodology::DVaR, Methodology::SVaR],
        }
    }
}

/// Scenario calendars for the two reporting periods. DVaR and SVaR scenario
/// ids are disjoint, so one calendar per period covers both methodologies.
#[derive(Debug, Default, Deserialize)]
struct DatesFile {
    #[serde(default)]
    cob: ScenarioCalendar,
    #[serde(default)]
    prev_cob: ScenarioCalendar,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            config,
            dates,
            methodology,
            tail_n,
        } => run_report(&input, config.as_deref(), dates.as_deref(), methodology, tail_n),
        Commands::Config => print_default_config(),
    }
}

/// The standard desk setup observed in the production extracts: FX, Rates
/// and EM Macro roll-up nodes, SVaR vectors in 1..=260, DVaR in 261..=520.
fn default_config() -> EngineConfig {
    EngineConfig {
        tail_n: DEFAULT_TAIL_N,
        ranges: ScenarioRanges {
            dvar: 261..=520,
            svar: 1..=260,
        },
        nodes: [
            (10, AssetClass::Fx),
            (22194, AssetClass::Rates),
            (137354, AssetClass::EmMacro),
        ]
        .into_iter()
        .collect(),
    }
}

fn print_default_config() {
    match serde_json::to_string_pretty(&default_config()) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&format!("could not serialize default config: {e}")),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

fn load_config(path: &Path) -> EngineConfig {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("cannot read config {}: {e}", path.display())));
    let config: EngineConfig = serde_json::from_str(&text)
        .unwrap_or_else(|e| fail(&format!("cannot parse config {}: {e}", path.display())));
    config
}

fn load_dates(path: &Path) -> DatesFile {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("cannot read dates {}: {e}", path.display())));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| fail(&format!("cannot parse dates {}: {e}", path.display())))
}

fn read_extract(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .unwrap_or_else(|e| fail(&format!("cannot read extract {}: {e}", path.display())))
}

fn run_report(
    input: &Path,
    config_path: Option<&Path>,
    dates_path: Option<&Path>,
    methodology: MethodologyArg,
    tail_n: Option<usize>,
) {
    let mut config = config_path.map_or_else(default_config, load_config);
    if let Some(n) = tail_n {
        config.tail_n = n;
    }
    if let Err(e) = config.validate() {
        fail(&e.to_string());
    }

    let dates = dates_path.map(load_dates).unwrap_or_default();
    let extract = read_extract(input);
    let records = records_from_frame(&extract, &config)
        .unwrap_or_else(|e| fail(&format!("ingestion failed: {e}")));

    for &m in methodology.selected() {
        print_methodology(&records, &config, m, &dates.cob, &dates.prev_cob);
    }
}

fn print_methodology(
    records: &[tails::RawRecord],
    config: &EngineConfig,
    methodology: Methodology,
    cob_calendar: &ScenarioCalendar,
    prev_calendar: &ScenarioCalendar,
) {
    let cob = match aggregate(records, methodology, Period::Cob, cob_calendar) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Skipping {methodology}: {e}");
            return;
        }
    };
    let prev = match aggregate(records, methodology, Period::PrevCob, prev_calendar) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Skipping {methodology}: {e}");
            return;
        }
    };

    let compared = compare_tails(&select_tails(&cob, config.tail_n), &prev);
    println!("\n{methodology} tail comparison (top {} each side)", config.tail_n);
    match tail_frame(&compared) {
        Ok(frame) => println!("{frame}"),
        Err(e) => eprintln!("{methodology} tail table unavailable: {e}"),
    }

    // A missing overlap kills only the changes table; the tails above have
    // already been printed.
    println!("\n{methodology} top changes (top {} each side)", config.tail_n);
    match top_changes(&cob, &prev, methodology, config.tail_n).and_then(|c| change_frame(&c)) {
        Ok(frame) => println!("{frame}"),
        Err(e) => eprintln!("{methodology} changes unavailable: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        default_config().validate().unwrap();
    }

    #[test]
    fn test_default_ranges_are_disjoint() {
        let config = default_config();
        assert_eq!(
            config.ranges.methodology_for(1),
            Some(Methodology::SVaR)
        );
        assert_eq!(
            config.ranges.methodology_for(261),
            Some(Methodology::DVaR)
        );
        assert_eq!(config.ranges.methodology_for(600), None);
    }

    #[test]
    fn test_methodology_selection() {
        assert_eq!(MethodologyArg::Dvar.selected(), &[Methodology::DVaR]);
        assert_eq!(
            MethodologyArg::Both.selected(),
            &[Methodology::DVaR, Methodology::SVaR]
        );
    }

    #[test]
    fn test_dates_file_parses() {
        let json = r#"{ "cob": { "261": "2025-06-06" }, "prev_cob": { "261": "2025-06-05" } }"#;
        let dates: DatesFile = serde_json::from_str(json).unwrap();
        assert_eq!(dates.cob.len(), 1);
        assert_eq!(dates.prev_cob.len(), 1);
    }
}
