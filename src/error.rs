use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Riot API error: {status} on {endpoint}")]
    Api { status: u16, endpoint: String },

    #[error("Riot API rejected the key (status {status}); check RIOT_API_KEY")]
    Auth { status: u16 },

    #[error("Rate limited, gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Summoner is not in an active game")]
    NotInGame,

    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Errors that must abort the run rather than skip the current cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Auth { .. } | AppError::Config(_))
    }
}
