use std::path::{Path, PathBuf};
use std::sync::Arc;

use canopy::{CanopyConfig, Detector, ScanCommand, ScanManager};
use clap::{Args, Parser, Subcommand};
use cli::{annotated_output_path, command_listing, ConfigFile, FireReport, ScanReport, SoilReport};
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

const SOIL_SUFFIX: &str = "desmatamento";
const FIRE_SUFFIX: &str = "incendio";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScanArgs {
    /// Path to the input image
    #[arg(short, long)]
    input: PathBuf,
    /// Directory for the annotated images
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Detector configuration (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print a JSON report instead of the summary lines
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both detectors
    Scan(ScanArgs),
    /// Run the soil-exposure detector only
    Soil(ScanArgs),
    /// Run the fire-hotspot detector only
    Fire(ScanArgs),
    /// Print the JSON schema of the configuration file
    ConfigSchema,
    /// Print the default configuration as TOML
    DefaultConfig,
    /// List the scan commands and what they do
    #[command(name = "commands")]
    ListCommands {
        /// Print the JSON schema of the commands instead
        #[arg(long)]
        schema: bool,
    },
}

#[derive(Clone, Copy)]
struct Selection {
    soil: bool,
    fire: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Scan(args) => run(args, Selection { soil: true, fire: true }).await?,
        Commands::Soil(args) => run(args, Selection { soil: true, fire: false }).await?,
        Commands::Fire(args) => run(args, Selection { soil: false, fire: true }).await?,
        Commands::ConfigSchema => {
            println!("{}", serde_json::to_string_pretty(&CanopyConfig::schema())?);
        }
        Commands::DefaultConfig => {
            print!("{}", CanopyConfig::default().to_toml()?);
        }
        Commands::ListCommands { schema } => {
            if *schema {
                println!("{}", serde_json::to_string_pretty(&ScanCommand::schema())?);
            } else {
                for line in command_listing() {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CanopyConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Ok(CanopyConfig::from_file(path)?)
        }
        None => Ok(CanopyConfig::default()),
    }
}

async fn run(args: &ScanArgs, selection: Selection) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut manager = ScanManager::with_config(&config)?;
    manager.load_image(&args.input)?;

    let image = match manager.image() {
        Some(image) => Arc::new(image.clone()),
        None => return Err(canopy::CanopyError::NoImageLoaded.into()),
    };
    info!("Loaded {:?} ({}x{})", args.input, image.width(), image.height());

    std::fs::create_dir_all(&args.output_dir)?;

    let soil_task = {
        let detector = manager.soil_detector();
        let image = Arc::clone(&image);
        tokio::task::spawn_blocking(move || {
            selection.soil.then(|| detector.detect(&image)).transpose()
        })
    };
    let fire_task = {
        let detector = manager.fire_detector();
        let image = Arc::clone(&image);
        tokio::task::spawn_blocking(move || {
            selection.fire.then(|| detector.detect(&image)).transpose()
        })
    };

    let (soil, fire) = tokio::try_join!(soil_task, fire_task)?;
    let mut report = ScanReport::new(&args.input);

    if let Some(soil) = soil? {
        let output = annotated_output_path(&args.output_dir, &args.input, SOIL_SUFFIX);
        soil.annotated_image.save(&output)?;
        info!("Saved {:?}", output);
        report.soil = Some(SoilReport::new(&soil, &output));
    }

    if let Some(fire) = fire? {
        let output = annotated_output_path(&args.output_dir, &args.input, FIRE_SUFFIX);
        fire.annotated_image.save(&output)?;
        info!("Saved {:?}", output);
        report.fire = Some(FireReport::new(&fire, &output));
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        for line in report.summary_lines() {
            println!("{line}");
        }
    }

    Ok(())
}
