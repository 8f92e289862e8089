#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the COVID-19 case map tool.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use covid_map_analytics::top_n;
use covid_map_case_models::CaseField;
use covid_map_cli_utils::{MultiProgress, Spinner, init_logger};
use covid_map_generate::map::DEFAULT_THRESHOLD_STEPS;
use covid_map_generate::{ExportInput, format_thousands, write_outputs};
use covid_map_ingest::pipeline::read_document;
use covid_map_ingest::{PipelineConfig, PipelineError, PipelineOutput, run, run_with_document};
use covid_map_scraper::ExtractStrategy;

#[derive(Parser)]
#[command(
    name = "covid_map_ingest",
    about = "Scrape COVID-19 case counts and join them with country coordinates"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "COVID_MAP_CONFIG")]
    config: Option<PathBuf>,
    /// URL of the page holding the case table
    #[arg(long, global = true)]
    url: Option<String>,
    /// Coordinate CSV file
    #[arg(long, global = true)]
    coordinates: Option<PathBuf>,
    /// Fetch timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// How country names are paired with figures (`row_wise` or `positional`)
    #[arg(long, global = true)]
    strategy: Option<ExtractStrategy>,
    /// Read the page from a saved file instead of fetching it
    #[arg(long, global = true)]
    from_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print world totals and the countries with the highest counts
    Report {
        /// Number of countries to list (defaults to `top` from the configuration)
        #[arg(long)]
        top: Option<usize>,
        /// Count to rank by
        #[arg(long, default_value = "cases")]
        rank_by: CaseField,
    },
    /// Write report, chart, and map files
    Export {
        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,
        /// GeoJSON country boundaries to annotate with case counts
        #[arg(long)]
        boundaries: Option<PathBuf>,
        /// Count shown in marker popups
        #[arg(long, default_value = "cases")]
        label: CaseField,
        /// Number of thresholds in the choropleth scale
        #[arg(long, default_value_t = DEFAULT_THRESHOLD_STEPS)]
        steps: usize,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    /// Loads the configuration file, if any, and applies flag overrides.
    fn pipeline_config(&self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url.clone_from(url);
        }
        if let Some(coordinates) = &self.coordinates {
            config.coordinates.clone_from(coordinates);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn execute(
    multi: &MultiProgress,
    config: &PipelineConfig,
    from_file: Option<&Path>,
) -> Result<PipelineOutput, PipelineError> {
    let start = Instant::now();
    let spinner = Spinner::start(multi, "Building case report...");

    let result = match from_file {
        Some(path) => {
            log::info!("Reading case table from {}", path.display());
            read_document(path).and_then(|document| run_with_document(config, &document))
        }
        None => run(config).await,
    };

    match &result {
        Ok(output) => spinner.finish(format!(
            "Joined {} countries in {:.1}s",
            output.report.rows.len(),
            start.elapsed().as_secs_f64()
        )),
        Err(e) => {
            spinner.finish_and_clear();
            log::error!("Pipeline failed at the {} stage: {e}", e.stage());
        }
    }

    result
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let cli = Cli::parse();
    let config = cli.pipeline_config()?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Report { top, rank_by } => {
            let output = execute(&multi, &config, cli.from_file.as_deref()).await?;
            let totals = output.totals;

            println!("Total cases:     {:>15}", format_thousands(totals.total_cases));
            println!("Total deaths:    {:>15}", format_thousands(totals.total_deaths));
            println!(
                "Total recovered: {:>15}",
                format_thousands(totals.total_recovered)
            );
            println!();

            let ranked = top_n(&output.report.rows, rank_by, top.unwrap_or(config.top));
            println!(
                "{:<4} {:<32} {:>15} {:>15} {:>15}",
                "#", "COUNTRY", "CASES", "DEATHS", "RECOVERED"
            );
            println!("{}", "-".repeat(85));
            for (i, row) in ranked.iter().enumerate() {
                println!(
                    "{:<4} {:<32} {:>15} {:>15} {:>15}",
                    i + 1,
                    row.country,
                    format_thousands(row.cases),
                    format_thousands(row.deaths),
                    format_thousands(row.recovered)
                );
            }

            if !output.report.unmatched_cases.is_empty() {
                log::warn!(
                    "{} countries have no coordinates: {}",
                    output.report.unmatched_cases.len(),
                    output.report.unmatched_cases.join(", ")
                );
            }
        }
        Commands::Export {
            out_dir,
            boundaries,
            label,
            steps,
        } => {
            let output = execute(&multi, &config, cli.from_file.as_deref()).await?;
            let summary = write_outputs(
                &out_dir,
                &ExportInput {
                    report: &output.report,
                    totals: output.totals,
                    source_url: &config.url,
                    label_field: label,
                    threshold_steps: steps,
                    top: config.top,
                    boundaries: boundaries.as_deref(),
                },
            )?;

            for path in &summary.files {
                println!("{}", path.display());
            }
            if !summary.unmatched_boundaries.is_empty() {
                log::warn!(
                    "{} boundary features have no case data",
                    summary.unmatched_boundaries.len()
                );
            }
        }
    }

    Ok(())
}
