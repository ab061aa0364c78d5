use clap::Parser;
use nexus_scoreboard::utils::error::ScoreboardError;
use nexus_scoreboard::utils::monitor::SystemMonitor;
use nexus_scoreboard::utils::{logger, validation::Validate};
use nexus_scoreboard::{AppConfig, CliArgs, EspnClient, ScoreboardManager, TerminalDisplay, WeatherClient};
use std::time::Duration;

fn fail(context: &str, e: &ScoreboardError) -> ! {
    tracing::error!(
        "{}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let mut config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}'", args.config);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };
    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code().max(1));
    }

    if let Err(e) = logger::init_app_logger(&config.logging, args.verbose) {
        eprintln!("❌ Could not start logging: {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    tracing::info!("Starting nexus-scoreboard");
    tracing::info!("Configuration loaded from {}", args.config);
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let api = match EspnClient::from_config(&config.api) {
        Ok(api) => api,
        Err(e) => fail("Could not create the ESPN client", &e),
    };

    let weather = if config.active_weather().is_some() {
        match WeatherClient::new(
            &config.api.weather_base_url,
            Duration::from_secs(config.api.timeout_secs),
        ) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Weather disabled, client could not be created: {}", e);
                None
            }
        }
    } else {
        None
    };

    let monitor = SystemMonitor::new(args.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mut manager = ScoreboardManager::new(config, api, weather, TerminalDisplay::stdout())
        .with_date(args.date.clone())
        .with_monitor(monitor);

    if args.once {
        match manager.run_once().await {
            Ok(report) => {
                tracing::info!(
                    mode = %report.mode,
                    games = report.games,
                    frames = report.frames,
                    "Single cycle completed"
                );
                println!(
                    "✅ Mode '{}': {} games, {} frames (next refresh in {}s)",
                    report.mode,
                    report.games,
                    report.frames,
                    report.refresh_interval.as_secs()
                );
            }
            Err(e) => fail("Scoreboard cycle failed", &e),
        }
        return;
    }

    tokio::select! {
        _ = manager.run() => {}
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => tracing::info!("Shutdown requested, stopping scoreboard"),
                Err(e) => tracing::error!("Could not listen for shutdown signal: {}", e),
            }
        }
    }
    tracing::info!("Scoreboard stopped");
}
