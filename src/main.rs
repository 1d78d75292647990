use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use canopy_forecaster::{
    config::ForecastConfig,
    features::{FeatureProvider, InMemoryFeatureStore},
    predict::PredictorSet,
    service::ForecastService,
    visualization::{
        print_cells_table, print_projection_table, print_summary_table, print_temperature_trend,
    },
};

#[derive(Parser)]
#[command(
    name = "canopy-forecast",
    about = "Urban Canopy Forecaster - street-tree growth and climate impact projections",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a cell's tree population and climate benefits forward
    Project {
        /// Path to the per-cell feature table (CSV)
        #[arg(short, long)]
        features: PathBuf,

        /// Cell to project (H3 index)
        #[arg(short, long)]
        cell: String,

        /// Projection horizon in years (1-30)
        #[arg(short, long, default_value = "10")]
        years: i64,

        /// New trees to plant at year 0
        #[arg(short, long, default_value = "0")]
        new_trees: i64,

        /// Directory with learned model artifacts (falls back to rule-based)
        #[arg(short, long)]
        models: Option<PathBuf>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Emit the raw projection as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Compare a planting scenario against the no-action baseline
    Compare {
        /// Path to the per-cell feature table (CSV)
        #[arg(short, long)]
        features: PathBuf,

        /// Cell to project (H3 index)
        #[arg(short, long)]
        cell: String,

        /// Projection horizon in years (1-30)
        #[arg(short, long, default_value = "10")]
        years: i64,

        /// New trees to plant in the action scenario
        #[arg(short, long)]
        new_trees: i64,

        /// Directory with learned model artifacts (falls back to rule-based)
        #[arg(short, long)]
        models: Option<PathBuf>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the cells known to a feature table
    Cells {
        /// Path to the per-cell feature table (CSV)
        #[arg(short, long)]
        features: PathBuf,
    },

    /// Start the HTTP API server
    #[cfg(feature = "web")]
    Serve {
        /// Path to the per-cell feature table (CSV)
        #[arg(short, long)]
        features: PathBuf,

        /// Directory with learned model artifacts (falls back to rule-based)
        #[arg(short, long)]
        models: Option<PathBuf>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

fn build_service(
    features: &PathBuf,
    models: Option<&PathBuf>,
    config: Option<&PathBuf>,
) -> Result<ForecastService> {
    let config = ForecastConfig::load_or_default(config.map(|p| p.as_path()))?;
    let store = InMemoryFeatureStore::from_csv_path(features)?;
    let predictors = match models {
        Some(dir) => PredictorSet::load(dir),
        None => PredictorSet::rule_based(),
    };
    Ok(ForecastService::new(
        Arc::new(store) as Arc<dyn FeatureProvider>,
        Arc::new(predictors),
        &config,
    ))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Project {
            features,
            cell,
            years,
            new_trees,
            models,
            config,
            json,
        } => {
            let service = build_service(&features, models.as_ref(), config.as_ref())?;
            let result = service.project(&cell, years, new_trees)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&*result)?);
            } else {
                println!(
                    "\n{}",
                    format!("Projection: cell {cell}, {years} years, {new_trees} new trees")
                        .bold()
                        .cyan()
                );
                println!(
                    "  Today: {:.0} trees, {:.1} cm avg DBH",
                    result.current_state.tree_count, result.current_state.avg_diameter_cm
                );
                print_projection_table(&result.yearly_projections);
                print_summary_table(&result.summary);
                print_temperature_trend(&result.yearly_projections);
            }
        }

        Commands::Compare {
            features,
            cell,
            years,
            new_trees,
            models,
            config,
        } => {
            if new_trees <= 0 {
                anyhow::bail!("--new-trees must be positive for a comparison");
            }
            let service = build_service(&features, models.as_ref(), config.as_ref())?;
            let baseline = service.project(&cell, years, 0)?;
            let action = service.project(&cell, years, new_trees)?;

            println!(
                "\n{}",
                format!("Scenario comparison: cell {cell}, {years} years").bold().cyan()
            );

            println!("\n{}", "No action".bold().yellow());
            print_summary_table(&baseline.summary);

            println!("\n{}", format!("Plant {new_trees} trees").bold().yellow());
            print_summary_table(&action.summary);

            let b = baseline.yearly_projections.last().map(|y| y.temperature_reduction_f);
            let a = action.yearly_projections.last().map(|y| y.temperature_reduction_f);
            if let (Some(b), Some(a)) = (b, a) {
                println!(
                    "\n  Year-{years} temperature difference: {}",
                    format!("{:+.3} °F", a - b).bold().green()
                );
            }
        }

        Commands::Cells { features } => {
            let store = InMemoryFeatureStore::from_csv_path(&features)?;
            println!(
                "\n{}",
                format!("Feature table: {}", features.display()).bold().cyan()
            );
            let mut cells = Vec::new();
            for id in store.cell_ids() {
                if let Ok(state) = store.cell_features(&id) {
                    cells.push((id, state));
                }
            }
            print_cells_table(&cells);
        }

        #[cfg(feature = "web")]
        Commands::Serve {
            features,
            models,
            config,
            port,
        } => {
            let service = build_service(&features, models.as_ref(), config.as_ref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(canopy_forecaster::web::start_server(service, port))?;
        }
    }

    Ok(())
}
