use anyhow::Context;
use astro_dash::config::cli::{Cli, Command};
use astro_dash::render::TerminalSink;
use astro_dash::utils::error::{DashError, ErrorSeverity};
use astro_dash::utils::{logger, validation::Validate};
use astro_dash::{DashboardConfig, DashboardEngine, DashboardServer, LocalStorage, ZipExportSink};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🔮 Starting astro-dash");

    let mut config = load_config(&cli)?;
    cli.apply(&mut config);
    if cli.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitoring.enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let outcome = match cli.command() {
        Command::Run(_) => serve(&config).await,
        Command::Scan(_) => scan(&config).await,
        Command::Export(_) => export(&config).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ astro-dash failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let code = exit_code(&e);
        if code > 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<DashboardConfig> {
    DashboardConfig::discover(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config file '{}'", path.display()),
        None => "Failed to load astro-dash.toml".to_string(),
    })
}

fn exit_code(error: &DashError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown requested");
}

async fn serve(config: &DashboardConfig) -> astro_dash::Result<()> {
    let addr = config.socket_addr()?;
    DashboardServer::from_config(config)?
        .serve_with_shutdown(addr, shutdown_signal())
        .await
}

async fn scan(config: &DashboardConfig) -> astro_dash::Result<()> {
    let plan = config.scan_plan()?;
    let engine =
        DashboardEngine::new_with_monitoring(config.scanner()?, TerminalSink, config.monitoring.enabled);

    if config.live.enabled {
        engine
            .run_live(&plan, config.refresh_interval(), shutdown_signal())
            .await;
    } else {
        engine.run_once(&plan).await?;
    }
    Ok(())
}

async fn export(config: &DashboardConfig) -> astro_dash::Result<()> {
    let plan = config.scan_plan()?;
    let storage = LocalStorage::new(&config.export.output_path);
    let snapshot = storage.resolve(astro_dash::adapters::export::SNAPSHOT_FILE);
    let engine = DashboardEngine::new_with_monitoring(
        config.scanner()?,
        ZipExportSink::new(storage),
        config.monitoring.enabled,
    );

    let board = engine.run_once(&plan).await?;
    println!("✅ Exported {} signals", board.shown);
    println!("📁 Output saved to: {}", snapshot.display());
    Ok(())
}
