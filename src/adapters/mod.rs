// Adapters layer: concrete implementations for external systems.

pub mod cache;
pub mod espn;
pub mod weather;

pub use cache::{CacheKey, FileCache};
pub use espn::{team_choices, CacheTtl, EspnClient, RateLimiter, TeamChoice, CATALOG};
pub use weather::{WeatherCache, WeatherCheck, WeatherClient};
