use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use nexus_scoreboard::adapters::{team_choices, EspnClient, WeatherClient, CATALOG};
use nexus_scoreboard::config::app_config::{
    DEFAULT_CONFIG_PATH, OPENWEATHER_BASE_URL, WEATHER_API_KEY_ENV,
};
use nexus_scoreboard::config::ApiConfig;
use nexus_scoreboard::domain::ports::SportsApi;
use nexus_scoreboard::utils::logger;
use nexus_scoreboard::AppConfig;
use std::path::Path;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "nexus-setup")]
#[command(about = "Configuration helper for nexus-scoreboard")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the sports and leagues the scoreboard supports
    Leagues,
    /// List the teams of a league with the ids used for favorites
    Teams {
        #[arg(long)]
        sport: String,
        #[arg(long)]
        league: String,
        /// Directory for cached API responses
        #[arg(long, default_value = "cache")]
        cache_dir: String,
    },
    /// Check an OpenWeatherMap API key against a location
    CheckWeather {
        /// City, e.g. "Denver, CO, US"
        #[arg(long)]
        location: String,
        /// Falls back to the OPENWEATHER_API_KEY environment variable
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Write a starter configuration file
    Init {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        output: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn list_leagues() {
    for sport in CATALOG {
        println!("{} ({})", sport.name, sport.value);
        for (name, id) in sport.leagues {
            println!("  {:<28} {}", name, id);
        }
    }
}

async fn list_teams(sport: &str, league: &str, cache_dir: &str) -> anyhow::Result<()> {
    let config = ApiConfig {
        cache_dir: cache_dir.to_string(),
        ..ApiConfig::default()
    };
    let client = EspnClient::from_config(&config).context("could not create ESPN client")?;
    let raw = client
        .teams(sport, league, 1000)
        .await
        .with_context(|| format!("could not fetch teams for {}/{}", sport, league))?;

    let choices = team_choices(&raw, league);
    if choices.is_empty() {
        bail!("no teams found for {}/{}", sport, league);
    }
    for choice in choices {
        println!("{:<8} {}", choice.id, choice.label);
    }
    Ok(())
}

async fn check_weather(location: &str, api_key: Option<String>) -> anyhow::Result<()> {
    let api_key = api_key
        .or_else(|| std::env::var(WEATHER_API_KEY_ENV).ok())
        .unwrap_or_default();
    let client = WeatherClient::new(OPENWEATHER_BASE_URL, Duration::from_secs(10))
        .context("could not create weather client")?;

    let check = client.validate(location, &api_key).await;
    if !check.is_valid() {
        bail!(check.describe());
    }
    println!("✅ {}", check.describe());
    Ok(())
}

fn write_starter(output: &str, force: bool) -> anyhow::Result<()> {
    let path = Path::new(output);
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite it", output);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }

    let json = AppConfig::starter().to_pretty_json()?;
    std::fs::write(path, json).with_context(|| format!("could not write {}", output))?;
    println!("✅ Configuration written to {}", output);
    println!("💡 Use `nexus-setup teams` to find favorite team ids");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    match args.command {
        Command::Leagues => list_leagues(),
        Command::Teams {
            sport,
            league,
            cache_dir,
        } => list_teams(&sport, &league, &cache_dir).await?,
        Command::CheckWeather { location, api_key } => check_weather(&location, api_key).await?,
        Command::Init { output, force } => write_starter(&output, force)?,
    }
    Ok(())
}
