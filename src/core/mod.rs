pub mod manager;
pub mod mode;
pub mod parser;

pub use crate::domain::model::{Board, DisplayMode, Game};
pub use crate::domain::ports::{SportsApi, WeatherProvider};
pub use manager::{Cycle, CycleReport, ScoreboardManager};
pub use mode::{determine_mode, refresh_interval, Favorites};
