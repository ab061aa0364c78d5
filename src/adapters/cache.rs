use crate::utils::error::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MAX_STEM_LEN: usize = 195;

/// What a cached response belongs to; decides the file name.
#[derive(Debug, Clone)]
pub enum CacheKey<'a> {
    Game {
        id: &'a str,
    },
    Teams {
        sport: &'a str,
        league: &'a str,
        params: &'a [(String, String)],
    },
    Url {
        url: &'a str,
        params: &'a [(String, String)],
    },
}

/// Maps characters that are unsafe in a file name to `_`.
fn flatten(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            '/' | '\\' | '.' | ':' | '?' | '&' | '=' => '_',
            other => other,
        })
        .collect()
}

fn param_suffix(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    sorted
        .iter()
        .map(|(k, v)| format!("{}-{}", flatten(k), flatten(v)))
        .collect::<Vec<_>>()
        .join("_")
}

impl CacheKey<'_> {
    pub fn file_name(&self) -> String {
        match self {
            CacheKey::Game { id } => format!("game_{}.json", flatten(id)),
            CacheKey::Teams {
                sport,
                league,
                params,
            } => {
                let (sport, league) = (flatten(sport), flatten(league));
                let suffix = param_suffix(params);
                if suffix.is_empty() {
                    format!("teams_{}_{}.json", sport, league)
                } else {
                    format!("teams_{}_{}_{}.json", sport, league, suffix)
                }
            }
            CacheKey::Url { url, params } => {
                let flattened = flatten(
                    url.trim_start_matches("https://")
                        .trim_start_matches("http://"),
                );
                let stem: String = format!("{}_{}", flattened, param_suffix(params))
                    .chars()
                    .take(MAX_STEM_LEN)
                    .collect();
                format!("{}.json", stem)
            }
        }
    }
}

/// JSON responses kept on disk, one file per request.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey<'_>) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Cached value younger than `ttl`. Unreadable or corrupt entries count
    /// as a miss.
    pub fn load(&self, path: &Path, ttl: Duration) -> Option<Value> {
        let metadata = fs::metadata(path).ok()?;
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .unwrap_or_default();
        if age > ttl {
            tracing::debug!(path = %path.display(), ?age, "Cache entry is stale");
            return None;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Could not read cache entry");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => {
                tracing::debug!(path = %path.display(), "Loaded from cache");
                Some(value)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Error decoding cached JSON");
                None
            }
        }
    }

    /// Best effort: a failed write only costs a refetch.
    pub fn save(&self, path: &Path, value: &Value) {
        let result = serde_json::to_string_pretty(value)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(path, json));
        match result {
            Ok(()) => tracing::debug!(path = %path.display(), "Saved to cache"),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "Error saving to cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_file_names() {
        assert_eq!(CacheKey::Game { id: "401" }.file_name(), "game_401.json");

        let params = vec![("limit".to_string(), "1000".to_string())];
        assert_eq!(
            CacheKey::Teams {
                sport: "football",
                league: "nfl",
                params: &params,
            }
            .file_name(),
            "teams_football_nfl_limit-1000.json"
        );
        assert_eq!(
            CacheKey::Teams {
                sport: "hockey",
                league: "nhl",
                params: &[],
            }
            .file_name(),
            "teams_hockey_nhl.json"
        );

        let params = vec![("dates".to_string(), "20250703".to_string())];
        assert_eq!(
            CacheKey::Url {
                url: "https://site.api.espn.com/apis/site/v2/sports/baseball/mlb/scoreboard",
                params: &params,
            }
            .file_name(),
            "site_api_espn_com_apis_site_v2_sports_baseball_mlb_scoreboard_dates-20250703.json"
        );
    }

    #[test]
    fn test_file_names_never_leave_the_cache_dir() {
        let params = vec![("dates".to_string(), "2025/10/19".to_string())];
        let names = [
            CacheKey::Url {
                url: "https://x.com/a",
                params: &params,
            }
            .file_name(),
            CacheKey::Teams {
                sport: "../football",
                league: "nfl\\x",
                params: &params,
            }
            .file_name(),
            CacheKey::Game { id: "../../etc/passwd" }.file_name(),
        ];

        assert_eq!(names[0], "x_com_a_dates-2025_10_19.json");
        for name in &names {
            assert!(!name.contains('/') && !name.contains('\\'), "{}", name);
            assert!(!name.contains(".."), "{}", name);
        }

        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let path = cache.path_for(&CacheKey::Game { id: "../escape" });
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn test_long_urls_are_truncated_but_keep_extension() {
        let url = format!("https://example.com/{}", "a".repeat(400));
        let name = CacheKey::Url {
            url: &url,
            params: &[],
        }
        .file_name();
        assert_eq!(name.len(), MAX_STEM_LEN + ".json".len());
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn test_save_then_load_respects_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path().join("cache")).unwrap();
        let path = cache.path_for(&CacheKey::Game { id: "7" });

        cache.save(&path, &serde_json::json!({"id": "7"}));
        assert_eq!(
            cache.load(&path, Duration::from_secs(60)),
            Some(serde_json::json!({"id": "7"}))
        );

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.load(&path, Duration::from_millis(1)).is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let path = cache.path_for(&CacheKey::Game { id: "bad" });
        fs::write(&path, "{not json").unwrap();

        assert!(cache.load(&path, Duration::from_secs(60)).is_none());
        assert!(cache.load(&dir.path().join("missing.json"), Duration::from_secs(60)).is_none());
    }
}
