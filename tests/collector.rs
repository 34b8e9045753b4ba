//! End-to-end collector tests against a mock Riot API and an in-memory
//! database.

use httpmock::prelude::*;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

use lol_analytics::collector::Collector;
use lol_analytics::config::TrackedSummoner;
use lol_analytics::db::{Repository, run_migrations};
use lol_analytics::riot::{Platform, RiotClient};

async fn test_repo() -> Repository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    Repository::new(pool)
}

fn collector_for(server: &MockServer, repo: Repository) -> Collector {
    let riot = RiotClient::with_base_url("RGAPI-TEST-KEY".to_string(), server.base_url());
    Collector::new(riot, repo)
}

fn target() -> TrackedSummoner {
    TrackedSummoner::parse("X#TAG", Platform::TR1).unwrap()
}

fn match_body(match_id: &str, creation: i64) -> serde_json::Value {
    json!({
        "metadata": { "matchId": match_id },
        "info": {
            "gameCreation": creation,
            "gameDuration": 1800,
            "gameMode": "CLASSIC",
            "gameType": "MATCHED_GAME",
            "queueId": 420,
            "participants": [
                {
                    "puuid": "puuid-x",
                    "summonerName": "X",
                    "riotIdGameName": "X",
                    "championName": "Ahri",
                    "kills": 5, "deaths": 2, "assists": 7,
                    "goldEarned": 12000,
                    "totalDamageDealtToChampions": 18000,
                    "visionScore": 30,
                    "win": true
                },
                {
                    "puuid": "puuid-y",
                    "summonerName": "Y",
                    "riotIdGameName": "Y",
                    "championName": "Zed",
                    "kills": 2, "deaths": 5, "assists": 3,
                    "goldEarned": 9000,
                    "totalDamageDealtToChampions": 11000,
                    "visionScore": 12,
                    "win": false
                }
            ]
        }
    })
}

fn mock_account(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/riot/account/v1/accounts/by-riot-id/X/TAG");
        then.status(200)
            .json_body(json!({"puuid": "puuid-x", "gameName": "X", "tagLine": "TAG"}));
    });
}

async fn count(repo: &Repository, table: &str) -> i64 {
    sqlx::query_as::<_, (i64,)>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(repo.pool())
        .await
        .unwrap()
        .0
}

#[tokio::test]
async fn collect_stores_three_matches_and_rerun_adds_nothing() {
    let server = MockServer::start();
    mock_account(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/match/v5/matches/by-puuid/puuid-x/ids")
            .query_param("count", "3");
        then.status(200).json_body(json!(["TR1_1", "TR1_2", "TR1_3"]));
    });
    let mut detail_mocks = Vec::new();
    for (i, id) in ["TR1_1", "TR1_2", "TR1_3"].iter().enumerate() {
        detail_mocks.push(server.mock(|when, then| {
            when.method(GET).path(format!("/lol/match/v5/matches/{id}"));
            then.status(200)
                .json_body(match_body(id, 1_700_000_000_000 + i as i64));
        }));
    }

    let repo = test_repo().await;
    let collector = collector_for(&server, repo.clone());

    let stored = collector.collect_history(&target(), 3).await.unwrap();
    assert_eq!(stored, 3);
    assert_eq!(count(&repo, "matches").await, 3);
    assert_eq!(count(&repo, "participants").await, 6);

    // Re-running is a no-op: already stored matches are not even refetched.
    let stored = collector.collect_history(&target(), 3).await.unwrap();
    assert_eq!(stored, 0);
    assert_eq!(count(&repo, "matches").await, 3);
    assert_eq!(count(&repo, "participants").await, 6);
    for m in &detail_mocks {
        m.assert_hits(1);
    }
}

#[tokio::test]
async fn collect_skips_a_failing_match_and_keeps_the_rest() {
    let server = MockServer::start();
    mock_account(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/match/v5/matches/by-puuid/puuid-x/ids");
        then.status(200).json_body(json!(["TR1_1", "TR1_BROKEN"]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/lol/match/v5/matches/TR1_1");
        then.status(200).json_body(match_body("TR1_1", 1_700_000_000_000));
    });
    server.mock(|when, then| {
        when.method(GET).path("/lol/match/v5/matches/TR1_BROKEN");
        then.status(500);
    });

    let repo = test_repo().await;
    let collector = collector_for(&server, repo.clone());

    let stored = collector.collect_history(&target(), 10).await.unwrap();
    assert_eq!(stored, 1);
    assert_eq!(count(&repo, "matches").await, 1);
}

#[tokio::test]
async fn collect_aborts_on_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(401);
    });

    let repo = test_repo().await;
    let collector = collector_for(&server, repo.clone());

    let res = collector.collect_history(&target(), 3).await;
    assert!(matches!(
        res,
        Err(lol_analytics::error::AppError::Auth { .. })
    ));
}

#[tokio::test]
async fn live_cycle_with_no_active_games_emits_no_snapshot() {
    let server = MockServer::start();
    mock_account(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/summoner/v4/summoners/by-puuid/puuid-x");
        then.status(200)
            .json_body(json!({"id": "summ-id-x", "puuid": "puuid-x", "summonerLevel": 120}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/spectator/v4/active-games/by-summoner/summ-id-x");
        then.status(404);
    });

    let repo = test_repo().await;
    let collector = collector_for(&server, repo.clone());

    let captured = collector.poll_targets_once(&[target()]).await.unwrap();
    assert_eq!(captured, 0);
    assert_eq!(count(&repo, "live_snapshots").await, 0);
}

#[tokio::test]
async fn live_cycle_with_active_game_stores_one_snapshot() {
    let server = MockServer::start();
    mock_account(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/summoner/v4/summoners/by-puuid/puuid-x");
        then.status(200)
            .json_body(json!({"id": "summ-id-x", "puuid": "puuid-x", "summonerLevel": 120}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/spectator/v4/active-games/by-summoner/summ-id-x");
        then.status(200).json_body(json!({
            "gameId": 424242,
            "gameMode": "CLASSIC",
            "gameLength": 600,
            "gameStartTime": 1_700_000_000_000i64,
            "platformId": "TR1",
            "participants": [
                {"puuid": "puuid-x", "summonerName": "X", "championId": 103, "teamId": 100}
            ]
        }));
    });

    let repo = test_repo().await;
    let collector = collector_for(&server, repo.clone());

    let captured = collector.poll_targets_once(&[target()]).await.unwrap();
    assert_eq!(captured, 1);

    let (game_id, summoner_name): (i64, String) =
        sqlx::query_as("SELECT game_id, summoner_name FROM live_snapshots")
            .fetch_one(repo.pool())
            .await
            .unwrap();
    assert_eq!(game_id, 424242);
    assert_eq!(summoner_name, "X");
}

/// Spins the scheduler until the mock saw `n` hits, without advancing the
/// paused clock (yielding keeps the runtime busy, so time never auto-advances).
async fn wait_for_hits(mock: &httpmock::Mock<'_>, n: usize) {
    for _ in 0..5_000_000 {
        if mock.hits() >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("mock never reached {n} hits");
}

async fn settle() {
    for _ in 0..10_000 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn live_loop_waits_the_full_interval_between_cycles() {
    use std::time::Duration;

    let server = MockServer::start();
    mock_account(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/summoner/v4/summoners/by-puuid/puuid-x");
        then.status(200)
            .json_body(json!({"id": "summ-id-x", "puuid": "puuid-x", "summonerLevel": 120}));
    });
    let spectator = server.mock(|when, then| {
        when.method(GET)
            .path("/lol/spectator/v4/active-games/by-summoner/summ-id-x");
        then.status(404);
    });

    let repo = test_repo().await;
    let collector = collector_for(&server, repo.clone());
    let targets = vec![target()];
    tokio::spawn(async move {
        let _ = collector
            .run_live(&targets, Duration::from_secs(30))
            .await;
    });

    // First cycle fires immediately and finds nobody in game.
    wait_for_hits(&spectator, 1).await;
    assert_eq!(count(&repo, "live_snapshots").await, 0);

    // Pause only now: under a paused clock sqlx's pool setup times out
    // (idle auto-advance) and a pending interval tick never fires while
    // the yield helpers spin, so the first cycle must run in real time.
    tokio::time::pause();

    // Just short of the interval: still no second cycle.
    tokio::time::advance(Duration::from_secs(29)).await;
    settle().await;
    assert_eq!(spectator.hits(), 1);

    // Crossing the interval wakes the loop for the next cycle.
    tokio::time::advance(Duration::from_secs(2)).await;
    wait_for_hits(&spectator, 2).await;
    assert_eq!(count(&repo, "live_snapshots").await, 0);
}

#[tokio::test]
async fn one_failing_target_does_not_abort_the_others() {
    let server = MockServer::start();
    // First target resolves to a server error, second works and is in game.
    server.mock(|when, then| {
        when.method(GET)
            .path("/riot/account/v1/accounts/by-riot-id/Broken/TAG");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/riot/account/v1/accounts/by-riot-id/X/TAG");
        then.status(200)
            .json_body(json!({"puuid": "puuid-x", "gameName": "X", "tagLine": "TAG"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/summoner/v4/summoners/by-puuid/puuid-x");
        then.status(200)
            .json_body(json!({"id": "summ-id-x", "puuid": "puuid-x", "summonerLevel": 120}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/lol/spectator/v4/active-games/by-summoner/summ-id-x");
        then.status(200).json_body(json!({
            "gameId": 99,
            "gameMode": "ARAM",
            "gameLength": 60,
            "gameStartTime": 0,
            "platformId": "TR1",
            "participants": []
        }));
    });

    let repo = test_repo().await;
    let collector = collector_for(&server, repo.clone());

    let targets = [
        TrackedSummoner::parse("Broken#TAG", Platform::TR1).unwrap(),
        target(),
    ];
    let captured = collector.poll_targets_once(&targets).await.unwrap();
    assert_eq!(captured, 1);
    assert_eq!(count(&repo, "live_snapshots").await, 1);
}
