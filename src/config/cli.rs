use crate::config::app_config::{AppConfig, DEFAULT_CONFIG_PATH};
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "nexus-scoreboard")]
#[command(about = "Multi-sport LED scoreboard")]
pub struct CliArgs {
    /// Path to the configuration file (.json or .toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Run a single fetch/render cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Scoreboard date as YYYYMMDD instead of today
    #[arg(long, value_parser = parse_scoreboard_date)]
    pub date: Option<String>,

    /// Override the response cache directory
    #[arg(long)]
    pub cache_dir: Option<String>,

    /// Log process CPU and memory after each cycle
    #[arg(long)]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

fn parse_scoreboard_date(value: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .map(|date| date.format("%Y%m%d").to_string())
        .map_err(|_| format!("'{}' is not a YYYYMMDD date", value))
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(cache_dir) = &self.cache_dir {
            config.api.cache_dir = cache_dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        let args = CliArgs::parse_from(["nexus-scoreboard", "--once", "--cache-dir", "/tmp/espn"]);
        assert_eq!(args.config, DEFAULT_CONFIG_PATH);
        assert!(args.once);
        assert!(!args.monitor);

        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.api.cache_dir, "/tmp/espn");
    }

    #[test]
    fn test_date_must_be_a_calendar_day() {
        let args = CliArgs::try_parse_from(["nexus-scoreboard", "--date", " 20251019"]).unwrap();
        assert_eq!(args.date.as_deref(), Some("20251019"));

        for bad in ["2025-10-19", "../../etc", "20251340", ""] {
            assert!(
                CliArgs::try_parse_from(["nexus-scoreboard", "--date", bad]).is_err(),
                "accepted {:?}",
                bad
            );
        }
    }
}
