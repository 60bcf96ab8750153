//! Offline report tool for the telematics risk pipeline.
//!
//! Simulates a fleet, builds leakage-safe features and forward labels,
//! fits demo model artifacts, and prints a calibration and pricing report:
//!
//! - `generate-config` writes a sample TOML config
//! - `generate-artifacts` writes demo classifier/explainer JSON artifacts
//! - `report` runs the full offline evaluation (default)
//! - `quote` prices a single simulated driver

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use telematics_risk::calibration::{brier_score, expected_calibration_error, ScoreStats};
use telematics_risk::simulate::{SimulatorConfig, TripSimulator};
use telematics_risk::{
    ClassifierArtifact, Error, EventStore, ExplainerArtifact, FeatureVector, IsotonicCalibration,
    MemoryEventStore, ModelArtifacts, RiskConfig, RiskPipeline, ARTIFACT_VERSION,
    MODEL_INPUT_FEATURES,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "risk_report")]
#[command(version, about = "Telematics risk pipeline report tool", long_about = None)]
struct Cli {
    /// Path to the pipeline config file
    #[arg(short, long, default_value = "risk_config.toml")]
    config: String,

    /// Simulation seed (same seed reproduces the same fleet)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of simulated drivers
    #[arg(long, default_value_t = 50)]
    drivers: usize,

    /// Trips per simulated driver
    #[arg(long, default_value_t = 40)]
    trips: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "risk_config.toml")]
        output: String,
    },
    /// Fit demo model artifacts from a simulated fleet and write them as JSON
    GenerateArtifacts {
        /// Output directory for classifier.json and explainer.json
        #[arg(short, long, default_value = "models")]
        output: String,
    },
    /// Run the offline calibration and pricing report (default)
    Report {
        /// Load artifacts from disk instead of fitting in-memory
        #[arg(long)]
        classifier: Option<PathBuf>,
        #[arg(long)]
        explainer: Option<PathBuf>,
    },
    /// Score and price one simulated driver
    Quote {
        /// Driver id, e.g. driver_7
        #[arg(long)]
        driver: String,
        /// Base premium to price against
        #[arg(long, default_value_t = 100.0)]
        base_premium: f64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut cli = Cli::parse();
    let command = cli.command.take();
    match command {
        Some(Commands::GenerateConfig { output }) => generate_config(&output),
        Some(Commands::GenerateArtifacts { output }) => generate_artifacts(&cli, &output),
        Some(Commands::Quote { driver, base_premium }) => quote(&cli, &driver, base_premium),
        Some(Commands::Report { classifier, explainer }) => {
            report(&cli, classifier.as_deref(), explainer.as_deref())
        }
        None => report(&cli, None, None),
    }
}

fn generate_config(output: &str) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(output, RiskConfig::sample_toml())?;
    println!("Sample config written to {output}");
    Ok(())
}

// ============================================================================
// Offline evaluation
// ============================================================================

struct FleetEvaluation {
    pipeline: RiskPipeline<MemoryEventStore>,
    /// (driver_id, features, claim) for every driver with a usable window.
    rows: Vec<(String, FeatureVector, bool)>,
    /// The evaluation cut point all features and labels were built at.
    cut: chrono::DateTime<Utc>,
    skipped: usize,
}

/// Simulate a fleet and build features/labels at a cut point 30 days before
/// the anchor, so every driver has a full forward label window.
fn build_fleet(cli: &Cli, config: RiskConfig) -> Result<FleetEvaluation, Error> {
    let anchor = Utc::now();
    let mut sim_config = SimulatorConfig::new(anchor, cli.seed);
    sim_config.n_drivers = cli.drivers;
    sim_config.trips_per_driver = cli.trips;
    let events = TripSimulator::new(sim_config).generate();
    let store = MemoryEventStore::from_events(events);
    let pipeline = RiskPipeline::new(store, config);

    let cut = anchor - Duration::days(30);
    let driver_ids = pipeline.store().driver_ids();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for driver_id in &driver_ids {
        let features = match pipeline.features(driver_id, cut) {
            Ok(f) => f,
            Err(Error::InsufficientData { .. }) => {
                skipped += 1;
                continue;
            }
            Err(other) => return Err(other),
        };
        let label = pipeline
            .label_builder()
            .build_label(pipeline.store(), driver_id, cut)?;
        rows.push((driver_id.clone(), features, label.claim_in_30d));
    }

    info!(
        drivers = driver_ids.len(),
        usable = rows.len(),
        skipped,
        "fleet built"
    );
    Ok(FleetEvaluation { pipeline, rows, cut, skipped })
}

/// Margin weights used for the demo artifacts. The production classifier
/// comes from the external training pipeline; this keeps the tool
/// self-contained.
const DEMO_WEIGHTS: [f64; 9] = [0.0, 0.02, 0.0, 0.0, 0.03, 0.25, 0.15, 0.05, 0.02];
const DEMO_INTERCEPT: f64 = -4.0;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Fit a self-consistent artifact pair from the fleet's features and labels.
fn fit_demo_artifacts(rows: &[(String, FeatureVector, bool)]) -> Result<ModelArtifacts, Error> {
    let schema: Vec<String> = MODEL_INPUT_FEATURES.iter().map(|s| s.to_string()).collect();

    let samples: Vec<(f64, bool)> = rows
        .iter()
        .map(|(_, features, claim)| {
            let margin: f64 = DEMO_INTERCEPT
                + DEMO_WEIGHTS
                    .iter()
                    .zip(features.model_inputs().iter())
                    .map(|(w, x)| w * x)
                    .sum::<f64>();
            (sigmoid(margin), *claim)
        })
        .collect();
    let calibration = IsotonicCalibration::fit(&samples)
        .unwrap_or(IsotonicCalibration {
            breakpoints: vec![0.0],
            values: vec![0.0],
        });

    let n = rows.len().max(1) as f64;
    let mut background = [0.0f64; 9];
    for (_, features, _) in rows {
        for (slot, value) in background.iter_mut().zip(features.model_inputs()) {
            *slot += value / n;
        }
    }

    ModelArtifacts::from_parts(
        ClassifierArtifact {
            version: ARTIFACT_VERSION,
            feature_schema: schema.clone(),
            weights: DEMO_WEIGHTS.to_vec(),
            intercept: DEMO_INTERCEPT,
            calibration,
        },
        ExplainerArtifact {
            version: ARTIFACT_VERSION,
            feature_schema: schema,
            weights: DEMO_WEIGHTS.to_vec(),
            background_means: background.to_vec(),
        },
    )
}

fn generate_artifacts(cli: &Cli, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = RiskConfig::load(Path::new(&cli.config))?;
    let fleet = build_fleet(cli, config)?;
    let artifacts = fit_demo_artifacts(&fleet.rows)?;

    std::fs::create_dir_all(output)?;
    let classifier_path = Path::new(output).join("classifier.json");
    let explainer_path = Path::new(output).join("explainer.json");
    std::fs::write(
        &classifier_path,
        serde_json::to_string_pretty(&artifacts.classifier)?,
    )?;
    std::fs::write(
        &explainer_path,
        serde_json::to_string_pretty(&artifacts.explainer)?,
    )?;
    println!(
        "Artifacts written to {} and {}",
        classifier_path.display(),
        explainer_path.display()
    );
    Ok(())
}

fn report(
    cli: &Cli,
    classifier: Option<&Path>,
    explainer: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = RiskConfig::load(Path::new(&cli.config))?;
    let fleet = build_fleet(cli, config)?;

    let artifacts = match (classifier, explainer) {
        (Some(c), Some(e)) => ModelArtifacts::load(c, e)?,
        _ => fit_demo_artifacts(&fleet.rows)?,
    };
    fleet.pipeline.bind_artifacts(artifacts);

    let cut = fleet.cut;
    let mut pairs = Vec::new();
    let mut scores = Vec::new();
    for (driver_id, _, claim) in &fleet.rows {
        let scored = fleet.pipeline.score(driver_id, cut)?;
        pairs.push((scored.probability, *claim));
        scores.push(scored.probability);
    }

    let stats = ScoreStats::from_scores(&scores).ok_or("no scorable drivers in fleet")?;
    let claim_rate =
        pairs.iter().filter(|(_, y)| *y).count() as f64 / pairs.len().max(1) as f64;

    println!("=== Calibration Report ===");
    println!("Drivers scored:     {}", pairs.len());
    println!("Drivers skipped:    {} (empty feature window)", fleet.skipped);
    println!("Claim rate:         {claim_rate:.4}");
    println!("Brier score:        {:.4}", brier_score(&pairs));
    println!("ECE (10 bins):      {:.4}", expected_calibration_error(&pairs, 10));
    println!("Score mean (mu):    {:.4}", stats.mean);
    println!("Score std (sigma):  {:.4}", stats.std);
    println!();

    let mut band_counts = std::collections::BTreeMap::new();
    for (driver_id, _, _) in &fleet.rows {
        let assessment = fleet.pipeline.assess(driver_id, cut, 100.0, 3)?;
        *band_counts.entry(assessment.band.clone()).or_insert(0usize) += 1;
    }

    println!("=== Pricing Bands (base premium 100) ===");
    for (band, count) in &band_counts {
        println!("{band:>10}: {count}");
    }
    println!();
    println!(
        "Update [pricing] mu/sigma in {} to {:.4}/{:.4} to recenter premiums.",
        cli.config, stats.mean, stats.std
    );
    Ok(())
}

fn quote(cli: &Cli, driver: &str, base_premium: f64) -> Result<(), Box<dyn std::error::Error>> {
    let config = RiskConfig::load(Path::new(&cli.config))?;
    let fleet = build_fleet(cli, config)?;
    let artifacts = fit_demo_artifacts(&fleet.rows)?;
    fleet.pipeline.bind_artifacts(artifacts);

    let assessment = fleet.pipeline.assess(driver, fleet.cut, base_premium, 3)?;
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}
