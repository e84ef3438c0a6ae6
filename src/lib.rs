//! # Cyclist Scatter
//!
//! Scatter plot of the fastest times up Alpe d'Huez: race year against
//! finish time, colored by whether the rider faced doping allegations.
//!
//! ## Pipeline
//!
//! Every pass loads the dataset (cached after the first success), tears
//! down the previous chart, rebuilds both time scales from the data and
//! the current canvas size, then draws axes, one marker per record and a
//! legend. Hovering a marker shows a tooltip; clicking a legend entry
//! hides or shows that category's markers.
//!
//! ## Modules
//!
//! - [`dataset`]: Sources, normalization and the dataset cache
//! - [`chart`]: Scales, the retained scene, renderer and interaction
//! - [`session`]: Page state and the pass lifecycle
//! - [`api`]: HTTP surface with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cyclist_scatter::{ChartSession, Config, Loader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let loader = Loader::from_config(&config.dataset)?;
//!
//!     let mut session = ChartSession::from_config(&config);
//!     let outcome = session.run(&loader).await;
//!     println!("{:?}: {}", outcome, session.summary().markers);
//!
//!     std::fs::write("chart.html", session.document())?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod session;

pub use api::{build_router, serve, ApiError, AppState};

pub use chart::{CanvasSize, RenderError, RenderedChart, Renderer, Scene, TimeScale};

pub use config::{
    ApiConfig, CanvasConfig, Config, ConfigError, DatasetConfig, LoggingConfig, TooltipConfig,
};

pub use dataset::{Category, DatasetSource, LoadError, Loader, RaceRecord, RawRecord};

pub use session::{ChartError, ChartSession, PassOutcome, SceneSummary};
