pub mod app_config;
#[cfg(feature = "cli")]
pub mod cli;

pub use app_config::{
    ApiConfig, AppConfig, CustomMessage, DisplaySettings, LeagueConfig, LoggingConfig, ModeBoards,
    RefreshIntervals, SportConfig, WeatherConfig,
};
#[cfg(feature = "cli")]
pub use cli::CliArgs;
