use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use weathercard::{
    ActivityEvaluator, CardRepository, CardService, FjallCardStore, MemoryCardStore,
    OpenWeatherClient, PersistentCache, WeatherCardConfig, WeatherCardError, telemetry, web,
};

#[derive(Parser)]
#[command(
    name = "weathercard",
    version,
    about = "Weather suitability cards for outdoor activities"
)]
struct Cli {
    /// Configuration file (defaults to <config dir>/weathercard/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and serve the static frontend
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Judge the current weather in a city for one activity
    Check {
        #[arg(long)]
        city: String,
        #[arg(short, long)]
        activity: String,
    },
    /// List supported activities
    Activities,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<WeatherCardError>() {
                Some(err) => eprintln!("Error: {}", err.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            if verbose {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = WeatherCardConfig::load_from_path(cli.config)?;
    // Exporters must be built before the runtime starts and flushed after it stops
    let _telemetry = telemetry::init(&config, cli.verbose)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli.command, config))
}

async fn execute(command: Commands, mut config: WeatherCardConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let store = FjallCardStore::open(&config.storage.data_dir)?;
            let service = build_service(&config, Arc::new(store))?;
            info!("Starting weathercard {}", weathercard::VERSION);
            web::run(&config, Arc::new(service)).await
        }
        Commands::Check { city, activity } => {
            let service = build_service(&config, Arc::new(MemoryCardStore::new()))?;
            let result = service.check(&city, &activity).await?;

            println!(
                "{}: {}, humidity {}, wind {}, rain {}",
                result.city,
                result.weather.format_temperature(),
                result.weather.format_humidity(),
                result.weather.format_wind(),
                result.weather.format_rain_probability()
            );
            match result.verdict.justification {
                Some(reason) if !result.verdict.suitable => {
                    println!("{}: not suitable. {reason}", result.activity.name);
                }
                _ => println!("{}: suitable", result.activity.name),
            }
            Ok(())
        }
        Commands::Activities => {
            for activity in ActivityEvaluator::default().activities() {
                println!("{:<10} {}", activity.id, activity.name);
            }
            Ok(())
        }
    }
}

fn build_service(
    config: &WeatherCardConfig,
    store: Arc<dyn CardRepository>,
) -> anyhow::Result<CardService> {
    let mut weather = OpenWeatherClient::new(config)?;
    match PersistentCache::open(&config.cache.location) {
        Ok(cache) => weather = weather.with_cache(cache),
        Err(e) => warn!("Weather cache disabled: {e}"),
    }

    Ok(CardService::new(
        Arc::new(weather),
        store,
        ActivityEvaluator::default(),
    ))
}
