use crate::config::toml_config::DashboardConfig;
use crate::domain::model::SymbolGroup;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "astro-dash")]
#[command(version, about = "Astrology-themed mock trading signal dashboard")]
pub struct Cli {
    /// Path to TOML configuration file (defaults to ./astro-dash.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log process CPU and memory after every scan
    #[arg(long, global = true)]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the HTML dashboard and JSON API
    Run(RunArgs),
    /// Scan once (or continuously with --live) and print the board
    Scan(ScanArgs),
    /// Scan once and write signals_snapshot.zip
    Export(ExportArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[arg(long = "server.address")]
    pub address: Option<String>,

    #[arg(long = "server.port")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// all_symbols, futures, watchlist, eye_symbols or custom
    #[arg(long)]
    pub group: Option<SymbolGroup>,

    /// Comma separated symbols; implies the custom group
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    #[arg(long)]
    pub min_confidence: Option<u8>,

    /// Comma separated signal codes, e.g. STRONG_BUY,SELL
    #[arg(long, value_delimiter = ',')]
    pub signals: Vec<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    #[arg(long)]
    pub max_workers: Option<usize>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Keep rescanning until Ctrl-C
    #[arg(long)]
    pub live: bool,

    /// Seconds between scans in live mode
    #[arg(long)]
    pub refresh: Option<u64>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long)]
    pub output_path: Option<String>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Run(RunArgs::default()))
    }

    /// 命令列參數覆蓋設定檔
    pub fn apply(&self, config: &mut DashboardConfig) {
        if self.monitor {
            config.monitoring.enabled = true;
        }

        match self.command() {
            Command::Run(args) => {
                if let Some(address) = args.address {
                    config.server.address = address;
                }
                if let Some(port) = args.port {
                    config.server.port = port;
                }
            }
            Command::Scan(args) => {
                args.selection.apply(config);
                config.live.enabled = args.live;
                if let Some(refresh) = args.refresh {
                    config.live.refresh_seconds = refresh;
                }
            }
            Command::Export(args) => {
                args.selection.apply(config);
                if let Some(output_path) = args.output_path {
                    config.export.output_path = output_path;
                }
            }
        }
    }
}

impl SelectionArgs {
    pub fn apply(&self, config: &mut DashboardConfig) {
        if !self.symbols.is_empty() {
            config.scan.group = SymbolGroup::Custom;
            config.scan.custom_symbols = self.symbols.clone();
        }
        if let Some(group) = self.group {
            config.scan.group = group;
        }
        if let Some(min_confidence) = self.min_confidence {
            config.filters.min_confidence = min_confidence;
        }
        if !self.signals.is_empty() {
            config.filters.signals = self.signals.clone();
        }
        if let Some(latitude) = self.latitude {
            config.observer.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            config.observer.longitude = longitude;
        }
        if let Some(max_workers) = self.max_workers {
            config.scan.max_workers = max_workers;
        }
    }
}
