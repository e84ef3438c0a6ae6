//! Cyclist Scatter CLI
//!
//! Command-line interface:
//! - Render the chart page to a file
//! - Print the normalized dataset
//! - Serve the chart over HTTP
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cyclist_scatter::chart::CanvasSize;
use cyclist_scatter::config::{generate_default_config, Config, LoggingConfig};
use cyclist_scatter::dataset::{format_time, Loader};
use cyclist_scatter::{serve, AppState, ChartSession, PassOutcome};

#[derive(Parser)]
#[command(name = "cyclist-scatter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scatter plot of doping allegations among the fastest Alpe d'Huez climbs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Read the dataset from a local JSON file instead of the network
    #[arg(short, long, global = true)]
    pub dataset: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one pass and write the chart page as HTML
    Render {
        /// Canvas width in pixels
        #[arg(long)]
        width: Option<f64>,
        /// Canvas height in pixels
        #[arg(long)]
        height: Option<f64>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the normalized dataset
    Records {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = RecordFormat::Table)]
        format: RecordFormat,
    },

    /// Serve the chart over HTTP
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RecordFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(path) = cli.dataset {
        config.dataset.file = Some(path);
    }

    init_logging(&config.logging);

    match cli.command {
        Commands::Config { output } => write_default_config(output.as_ref())?,

        Commands::Render {
            width,
            height,
            output,
        } => {
            let loader = build_loader(&config)?;
            let mut session = ChartSession::from_config(&config);
            let size = CanvasSize::new(
                width.unwrap_or(config.canvas.width),
                height.unwrap_or(config.canvas.height),
            );

            let outcome = session.resize(size, &loader).await;
            let document = session.document();

            match output {
                Some(path) => {
                    std::fs::write(&path, &document)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    eprintln!("Chart written to {:?}", path);
                }
                None => print!("{}", document),
            }

            if !matches!(outcome, PassOutcome::Rendered { .. }) {
                eprintln!("No chart could be rendered; see the log for details");
                std::process::exit(1);
            }
        }

        Commands::Records { format } => {
            let records = build_loader(&config)?.records().await?;
            match format {
                RecordFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&*records)?);
                }
                RecordFormat::Table => {
                    println!(
                        "{:<4} {:<6} {:<7} {:<26} {:<4} {}",
                        "#", "Year", "Time", "Name", "Nat", "Doping"
                    );
                    println!("{}", "-".repeat(72));
                    for record in records.iter() {
                        println!(
                            "{:<4} {:<6} {:<7} {:<26} {:<4} {}",
                            record.place,
                            record.calendar_year(),
                            format_time(&record.time),
                            record.name,
                            record.nationality,
                            if record.has_allegation() { "yes" } else { "-" }
                        );
                    }
                    println!();
                    println!("{} records", records.len());
                }
            }
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }

            tracing::info!(
                "Starting cyclist-scatter v{} on {}",
                env!("CARGO_PKG_VERSION"),
                config.api.addr()
            );

            let loader = build_loader(&config)?;
            let state = AppState::new(ChartSession::from_config(&config), loader);
            serve(state, &config.api).await?;
        }
    }

    Ok(())
}

fn build_loader(config: &Config) -> anyhow::Result<Arc<Loader>> {
    let loader = Loader::from_config(&config.dataset).context("Failed to set up dataset source")?;
    tracing::debug!(source = loader.source_name(), "Dataset source ready");
    Ok(Arc::new(loader))
}

/// `RUST_LOG` wins over the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("cyclist_scatter={},tower_http={}", logging.level, logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}
