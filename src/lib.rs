pub mod adapters;
pub mod config;
pub mod core;
pub mod display;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{EspnClient, FileCache, WeatherClient};
pub use config::AppConfig;
pub use core::{CycleReport, ScoreboardManager};
pub use display::{Display, TerminalDisplay};
pub use utils::error::{Result, ScoreboardError};
