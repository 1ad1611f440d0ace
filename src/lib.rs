pub mod adapters;
pub mod astro;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod server;
pub mod utils;

pub use adapters::{LocalStorage, YahooQuoteSource, ZipExportSink};
#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::DashboardConfig;
pub use crate::core::{DashboardEngine, ScanPlan, Scanner};
pub use server::DashboardServer;
pub use utils::error::{DashError, Result};
