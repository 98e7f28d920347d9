//! Evaluation CLI for exercising the recommendation pipeline.
//!
//! Usage:
//!     luxrec recommend "office 45 m2, ceiling height 3.2, budget 20000"
//!     luxrec extract "kitchen 25 sqm"
//!     luxrec check

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use luxrec_catalog::Catalog;
use luxrec_engine::{recommend, EngineConfig};
use luxrec_extract::extract;
use luxrec_score::LinearModel;

#[derive(Parser)]
#[command(name = "luxrec")]
#[command(about = "Recommend lighting fixtures for a room")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Fixture catalog CSV
    #[arg(long, default_value = "data/fixtures.csv")]
    catalog: PathBuf,

    /// Scoring model artifact
    #[arg(long, default_value = "data/model.json")]
    model: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend fixtures for a free-text room description
    Recommend {
        /// Room description, e.g. "office 45 m2, budget 20000"
        text: String,

        /// Number of candidates to return
        #[arg(short = 'n', long, default_value = "3")]
        top_n: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the room parameters extracted from a free-text description
    Extract {
        /// Room description
        text: String,
    },

    /// Validate that the catalog and model artifacts load cleanly
    Check,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("luxrec=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            text,
            top_n,
            format,
        } => run_recommend(&cli.catalog, &cli.model, &text, top_n, &format),
        Commands::Extract { text } => run_extract(&text),
        Commands::Check => run_check(&cli.catalog, &cli.model),
    }
}

fn run_recommend(
    catalog_path: &Path,
    model_path: &Path,
    text: &str,
    top_n: usize,
    format: &str,
) -> Result<()> {
    let catalog = Catalog::from_csv_path(catalog_path)
        .with_context(|| format!("loading catalog from {}", catalog_path.display()))?;
    let model = LinearModel::from_json_path(model_path)
        .with_context(|| format!("loading model from {}", model_path.display()))?;

    let params = extract(text);
    let config = EngineConfig {
        top_n,
        ..EngineConfig::default()
    };

    let result = recommend(&params, catalog.fixtures(), &model, &config)
        .context("recommendation failed")?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result.ranked)?);
        return Ok(());
    }

    println!("Room: {} | {} m2 | target {} lx | budget {}",
        params.room_type, params.area_m2, params.target_illuminance_lux, params.budget);
    println!("---");
    for (i, candidate) in result.ranked.iter().enumerate() {
        println!(
            "\n{}. {} {} ({})",
            i + 1,
            candidate.fixture.brand,
            candidate.fixture.fixture_type,
            candidate.fixture.series
        );
        println!(
            "   {} pcs | {:.1} W total | ~{:.1} lx ({})",
            candidate.required_fixture_count,
            candidate.total_power_w,
            candidate.achieved_illuminance_lux,
            candidate.illumination_level.label()
        );
        println!(
            "   Cost: {:.2} ({:.1}% of budget) | Score: {:.3}",
            candidate.total_cost, candidate.budget_fraction_pct, candidate.predicted_score
        );
    }
    println!("\n---");
    println!("{}", result.summary);

    Ok(())
}

fn run_extract(text: &str) -> Result<()> {
    let params = extract(text);
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

fn run_check(catalog_path: &Path, model_path: &Path) -> Result<()> {
    let catalog = Catalog::from_csv_path(catalog_path)
        .with_context(|| format!("loading catalog from {}", catalog_path.display()))?;
    println!("catalog: {} fixtures", catalog.len());

    LinearModel::from_json_path(model_path)
        .with_context(|| format!("loading model from {}", model_path.display()))?;
    println!("model: {} feature columns", luxrec_score::FEATURE_COLUMNS.len());

    println!("OK");
    Ok(())
}
