use std::fmt::Debug;
use std::time::Duration;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use reqwest::{StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::error::AppError;

use super::region::{Platform, Region};
use super::types::{AccountDto, CurrentGameDto, MatchDto, SummonerDto};

/// Bounded attempts when the API answers 429 before we give up on the cycle.
const MAX_RATE_LIMIT_ATTEMPTS: u32 = 3;

pub struct RiotClient {
    pub client: reqwest::Client,
    pub limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    /// Riot API Key
    key: String,
    /// Routes every request to a fixed host instead of the official ones.
    /// Used by the test suite to point at a mock server.
    base_override: Option<String>,
}

impl RiotClient {
    pub fn new(key: String) -> Self {
        let q = Quota::per_minute(nonzero!(100_u32)).allow_burst(nonzero!(20_u32));

        Self {
            client: reqwest::Client::new(),
            limiter: RateLimiter::direct(q),
            key,
            base_override: None,
        }
    }

    pub fn with_base_url(key: String, base_url: String) -> Self {
        Self {
            base_override: Some(base_url),
            ..Self::new(key)
        }
    }

    fn region_base(&self, region: Region) -> String {
        match &self.base_override {
            Some(base) => base.clone(),
            None => region.base_url(),
        }
    }

    fn platform_base(&self, platform: Platform) -> String {
        match &self.base_override {
            Some(base) => base.clone(),
            None => platform.base_url(),
        }
    }

    // Account-V1 endpoint
    pub async fn get_account_by_riot_id(
        &self,
        region: Region,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountDto, AppError> {
        tracing::trace!("get_account_by_riot_id {}#{}", game_name, tag_line);

        let path = format!(
            "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
            self.region_base(region),
            game_name,
            tag_line
        );

        self.request(path).await
    }

    // Summoner-V4 endpoint
    pub async fn get_summoner_by_puuid(
        &self,
        platform: Platform,
        puuid: &str,
    ) -> Result<SummonerDto, AppError> {
        tracing::trace!("get_summoner_by_puuid {} on {}", puuid, platform);

        let path = format!(
            "{}/lol/summoner/v4/summoners/by-puuid/{}",
            self.platform_base(platform),
            puuid
        );

        self.request(path).await
    }

    // Match-V5 endpoints
    pub async fn get_match_ids(
        &self,
        region: Region,
        puuid: &str,
        count: u32,
    ) -> Result<Vec<String>, AppError> {
        tracing::trace!("get_match_ids {} in {} (count {})", puuid, region, count);

        let path = format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids?start=0&count={}",
            self.region_base(region),
            puuid,
            count
        );

        self.request(path).await
    }

    pub async fn get_match(&self, region: Region, match_id: &str) -> Result<MatchDto, AppError> {
        tracing::trace!("get_match {} in {}", match_id, region);

        let path = format!(
            "{}/lol/match/v5/matches/{}",
            self.region_base(region),
            match_id
        );

        self.request(path).await
    }

    // Spectator-V4 endpoint
    pub async fn get_active_game(
        &self,
        platform: Platform,
        summoner_id: &str,
    ) -> Result<CurrentGameDto, AppError> {
        tracing::trace!("get_active_game {} on {}", summoner_id, platform);

        let path = format!(
            "{}/lol/spectator/v4/active-games/by-summoner/{}",
            self.platform_base(platform),
            summoner_id
        );

        // A 404 from the spectator endpoint means the player is simply not in
        // a game right now.
        match self.request(path).await {
            Err(AppError::NotFound(_)) => Err(AppError::NotInGame),
            other => other,
        }
    }

    /// Shared request logic: client-side quota shaping, auth header, status
    /// mapping and Retry-After aware backoff on 429.
    async fn request<T: DeserializeOwned + Debug>(&self, path: String) -> Result<T, AppError> {
        let mut attempts = 0;

        loop {
            self.limiter.until_ready().await;
            attempts += 1;

            let res = self
                .client
                .get(&path)
                .header("X-Riot-Token", &self.key)
                .send()
                .await?;

            match res.status() {
                StatusCode::OK => return Ok(res.json().await?),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(AppError::Auth {
                        status: res.status().as_u16(),
                    });
                }
                StatusCode::NOT_FOUND => return Err(AppError::NotFound(path)),
                StatusCode::TOO_MANY_REQUESTS => {
                    if attempts >= MAX_RATE_LIMIT_ATTEMPTS {
                        return Err(AppError::RateLimited { attempts });
                    }
                    let wait = retry_after_secs(&res).unwrap_or(1);
                    tracing::warn!(
                        attempt = attempts,
                        wait_secs = wait,
                        "rate limited by Riot API, backing off"
                    );
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                status => {
                    return Err(AppError::Api {
                        status: status.as_u16(),
                        endpoint: path,
                    });
                }
            }
        }
    }
}

fn retry_after_secs(res: &reqwest::Response) -> Option<u64> {
    res.headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    fn client_for(server: &MockServer) -> RiotClient {
        RiotClient::with_base_url("RGAPI-TEST-KEY".to_string(), server.base_url())
    }

    #[tokio::test]
    async fn get_account_sends_api_key_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/riot/account/v1/accounts/by-riot-id/Chalop/3012")
                .header("X-Riot-Token", "RGAPI-TEST-KEY");
            then.status(200)
                .json_body(serde_json::json!({"puuid": "abc", "gameName": "Chalop", "tagLine": "3012"}));
        });

        let account = client_for(&server)
            .get_account_by_riot_id(Region::Europe, "Chalop", "3012")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(account.puuid, "abc");
        assert_eq!(account.game_name, Some("Chalop".to_string()));
    }

    #[tokio::test]
    async fn forbidden_maps_to_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(403);
        });

        let res = client_for(&server)
            .get_match_ids(Region::Europe, "puuid", 5)
            .await;

        assert!(matches!(res, Err(AppError::Auth { status: 403 })));
    }

    #[tokio::test]
    async fn spectator_404_maps_to_not_in_game() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });

        let res = client_for(&server)
            .get_active_game(Platform::TR1, "summoner-id")
            .await;

        assert!(matches!(res, Err(AppError::NotInGame)));
    }

    #[tokio::test]
    async fn rate_limited_request_recovers_on_a_later_attempt() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let server = MockServer::start();

        // First request is throttled, every following one succeeds.
        static THROTTLED: AtomicBool = AtomicBool::new(true);
        let limited = server.mock(|when, then| {
            when.method(GET)
                .path("/lol/match/v5/matches/EUW1_123")
                .matches(|_| THROTTLED.swap(false, Ordering::SeqCst));
            then.status(429).header("Retry-After", "0");
        });
        let ok = server.mock(|when, then| {
            when.method(GET).path("/lol/match/v5/matches/EUW1_123");
            then.status(200).json_body(serde_json::json!({
                "metadata": { "matchId": "EUW1_123" },
                "info": {
                    "gameCreation": 1_700_000_000_000i64,
                    "gameDuration": 1800,
                    "gameMode": "CLASSIC",
                    "gameType": "MATCHED_GAME",
                    "queueId": 420,
                    "participants": []
                }
            }));
        });

        let data = client_for(&server)
            .get_match(Region::Europe, "EUW1_123")
            .await
            .unwrap();

        assert_eq!(data.metadata.match_id, "EUW1_123");
        limited.assert();
        ok.assert();
    }

    #[tokio::test]
    async fn rate_limit_gives_up_after_bounded_attempts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(429).header("Retry-After", "0");
        });

        let res = client_for(&server)
            .get_match(Region::Europe, "EUW1_123")
            .await;

        assert!(matches!(res, Err(AppError::RateLimited { attempts: 3 })));
        mock.assert_hits(3);
    }
}
