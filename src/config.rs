use std::{env, fs, path::Path};

use crate::error::AppError;
use crate::riot::Platform;

/// A player identity to poll, scoped to a platform. Read-only after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSummoner {
    pub game_name: String,
    pub tag_line: String,
    pub platform: Platform,
}

impl TrackedSummoner {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }

    /// Parses a `Name#TAG[,platform]` entry as found in `summoners.txt` or
    /// the `TRACKED_SUMMONERS` variable.
    pub fn parse(entry: &str, default_platform: Platform) -> Result<Self, AppError> {
        let (riot_id, platform) = match entry.split_once(',') {
            Some((id, platform)) => (id.trim(), platform.trim().parse()?),
            None => (entry.trim(), default_platform),
        };

        let (game_name, tag_line) = riot_id
            .split_once('#')
            .ok_or_else(|| AppError::Config(format!("invalid riot id '{riot_id}', expected Name#TAG")))?;

        if game_name.is_empty() || tag_line.is_empty() {
            return Err(AppError::Config(format!(
                "invalid riot id '{riot_id}', expected Name#TAG"
            )));
        }

        Ok(Self {
            game_name: game_name.to_string(),
            tag_line: tag_line.to_string(),
            platform,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub riot_api_key: String,
    pub database_url: String,
    pub polling_interval_secs: u64,
    pub default_platform: Platform,
    pub tracked_summoners: Vec<TrackedSummoner>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        const DEFAULT_POLLING_INTERVAL_SECS: u64 = 30;
        const SUMMONERS_FILE: &str = "summoners.txt";

        let riot_api_key = env::var("RIOT_API_KEY")
            .map_err(|_| AppError::Config("RIOT_API_KEY must be set".into()))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:lol_analytics.db?mode=rwc".into());

        let polling_interval_secs = env::var("POLL_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLLING_INTERVAL_SECS);

        let default_platform = match env::var("DEFAULT_PLATFORM") {
            Ok(v) => v.parse()?,
            Err(_) => Platform::TR1,
        };

        let tracked_summoners = load_tracked_summoners(default_platform, SUMMONERS_FILE)?;

        Ok(Self {
            riot_api_key,
            database_url,
            polling_interval_secs,
            default_platform,
            tracked_summoners,
        })
    }
}

/// Tracked summoners come from `TRACKED_SUMMONERS` (comma separated) or, when
/// unset, from a `summoners.txt` file with one `Name#TAG[,platform]` per line.
/// Lines starting with `#` are comments.
fn load_tracked_summoners(
    default_platform: Platform,
    file: &str,
) -> Result<Vec<TrackedSummoner>, AppError> {
    if let Ok(raw) = env::var("TRACKED_SUMMONERS") {
        return raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| TrackedSummoner::parse(s, default_platform))
            .collect();
    }

    if Path::new(file).exists() {
        let contents = fs::read_to_string(file)
            .map_err(|e| AppError::Config(format!("failed to read {file}: {e}")))?;
        return contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| TrackedSummoner::parse(l, default_platform))
            .collect();
    }

    Ok(Vec::new())
}
