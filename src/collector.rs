//! Polling orchestration. Two variants share the same fetch + ingest core:
//! a one-shot historical backfill (`collect_history`) and an unbounded live
//! loop (`run_live`) capturing snapshots of active games.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::TrackedSummoner;
use crate::db::{LiveSnapshotRow, Repository};
use crate::error::AppError;
use crate::processor::flatten_match;
use crate::riot::RiotClient;

pub struct Collector {
    riot: RiotClient,
    db: Repository,
}

impl Collector {
    pub fn new(riot: RiotClient, db: Repository) -> Self {
        Self { riot, db }
    }

    // === Historical variant ===

    /// Fetches up to `count` most-recent matches for one summoner and stores
    /// them. Already-stored matches are skipped without refetching details.
    /// Returns the number of newly stored matches.
    pub async fn collect_history(
        &self,
        target: &TrackedSummoner,
        count: u32,
    ) -> Result<u32, AppError> {
        let region = target.platform.to_region();
        let account = self
            .riot
            .get_account_by_riot_id(region, &target.game_name, &target.tag_line)
            .await?;

        let match_ids = self.riot.get_match_ids(region, &account.puuid, count).await?;
        info!(
            riot_id = %target.riot_id(),
            found = match_ids.len(),
            "📥 collecting match history"
        );

        let mut stored = 0;
        for match_id in &match_ids {
            if self.db.has_match(match_id).await? {
                debug!(%match_id, "📥 already stored, skipping fetch");
                continue;
            }

            match self.ingest_match(region, match_id).await {
                Ok(true) => stored += 1,
                Ok(false) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(%match_id, error = %e, "📥 ⚠️ failed to ingest match"),
            }
        }

        info!(riot_id = %target.riot_id(), stored, "📥 ✅ collection finished");
        Ok(stored)
    }

    async fn ingest_match(
        &self,
        region: crate::riot::Region,
        match_id: &str,
    ) -> Result<bool, AppError> {
        let data = self.riot.get_match(region, match_id).await?;
        let (match_row, participants) = flatten_match(&data);
        self.db.insert_match(&match_row, &participants).await
    }

    // === Live variant ===

    /// Unbounded polling loop: every tick checks each tracked summoner for an
    /// active game and captures one snapshot per hit. Only a fatal error (bad
    /// API key) breaks the loop; the caller is responsible for cancellation
    /// via process signal.
    pub async fn run_live(
        &self,
        targets: &[TrackedSummoner],
        poll_interval: Duration,
    ) -> Result<(), AppError> {
        if targets.is_empty() {
            return Err(AppError::Config(
                "no tracked summoners configured; set TRACKED_SUMMONERS or create summoners.txt"
                    .into(),
            ));
        }

        info!(
            targets = targets.len(),
            interval_secs = poll_interval.as_secs(),
            "🔄 live collector started"
        );

        let mut ticker = interval(poll_interval);
        loop {
            ticker.tick().await;
            self.poll_targets_once(targets).await?;
        }
    }

    /// One polling cycle over every target, sequentially. Per-target failures
    /// are logged and do not abort the rest of the cycle; fatal errors
    /// propagate. Returns the number of snapshots captured.
    pub async fn poll_targets_once(
        &self,
        targets: &[TrackedSummoner],
    ) -> Result<usize, AppError> {
        let mut captured = 0;
        for target in targets {
            match self.check_target(target).await {
                Ok(true) => captured += 1,
                Ok(false) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(riot_id = %target.riot_id(), error = %e, "🔄 ⚠️ target check failed")
                }
            }
        }
        debug!(captured, "🔄 polling cycle finished");
        Ok(captured)
    }

    /// Checks a single summoner for an active game; stores a snapshot if one
    /// is running. `Ok(false)` when the player is simply not in a game.
    async fn check_target(&self, target: &TrackedSummoner) -> Result<bool, AppError> {
        let region = target.platform.to_region();
        let account = self
            .riot
            .get_account_by_riot_id(region, &target.game_name, &target.tag_line)
            .await?;
        let summoner = self
            .riot
            .get_summoner_by_puuid(target.platform, &account.puuid)
            .await?;

        let game = match self.riot.get_active_game(target.platform, &summoner.id).await {
            Ok(game) => game,
            Err(AppError::NotInGame) => {
                debug!(riot_id = %target.riot_id(), "🔄 not in game");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        info!(
            riot_id = %target.riot_id(),
            game_id = game.game_id,
            game_mode = %game.game_mode,
            "🔄 ✅ active game found, capturing snapshot"
        );

        let snapshot = LiveSnapshotRow {
            game_id: game.game_id,
            puuid: account.puuid,
            summoner_name: target.game_name.clone(),
            platform_id: game.platform_id,
            game_mode: game.game_mode,
            game_length: game.game_length,
            captured_at: unix_now(),
        };
        self.db.insert_live_snapshot(&snapshot).await?;
        Ok(true)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
