//! Declarative SQL executed by the database engine. The rolling indicators are
//! computed entirely with window functions; application code only binds the
//! summoner name and row limit.

/// Rolling 14-sample RSI over a summoner's KDA ratio.
///
/// The window is ordered by `game_duration`, matching the ordering the
/// dashboard queries have always used. A window with no losses yields a NULL
/// RSI (`NULLIF` guard) instead of a division error, and the series stays NULL
/// until 14 deltas are available.
pub const RSI: &str = r#"
WITH series AS (
    SELECT p.match_id, p.kda_ratio, m.game_duration
    FROM participants p
    JOIN matches m ON m.match_id = p.match_id
    WHERE p.summoner_name = ?1
),
deltas AS (
    SELECT match_id, kda_ratio, game_duration,
           kda_ratio - LAG(kda_ratio) OVER (ORDER BY game_duration) AS delta
    FROM series
),
rolling AS (
    SELECT match_id, kda_ratio, game_duration,
           AVG(CASE WHEN delta IS NULL THEN NULL WHEN delta > 0 THEN delta ELSE 0.0 END)
               OVER (ORDER BY game_duration ROWS BETWEEN 13 PRECEDING AND CURRENT ROW) AS avg_gain,
           AVG(CASE WHEN delta IS NULL THEN NULL WHEN delta < 0 THEN -delta ELSE 0.0 END)
               OVER (ORDER BY game_duration ROWS BETWEEN 13 PRECEDING AND CURRENT ROW) AS avg_loss,
           COUNT(delta)
               OVER (ORDER BY game_duration ROWS BETWEEN 13 PRECEDING AND CURRENT ROW) AS samples
    FROM deltas
)
SELECT match_id,
       kda_ratio,
       CASE
           WHEN samples < 14 THEN NULL
           ELSE 100.0 - 100.0 / (1.0 + avg_gain / NULLIF(avg_loss, 0.0))
       END AS rsi
FROM rolling
ORDER BY game_duration
LIMIT ?2
"#;

/// Rolling 20-sample window statistics behind the Bollinger Bands over gold
/// per minute. SQLite has no STDDEV built-in and the bundled build ships no
/// math functions either, so the query returns the moving average together
/// with avg(x²) and the sample count; the repository derives the stddev and
/// the ±2σ bands when mapping rows. The rolling window itself stays in the
/// database engine.
pub const BOLLINGER_BANDS: &str = r#"
WITH series AS (
    SELECT p.match_id, p.gold_per_minute, m.game_creation
    FROM participants p
    JOIN matches m ON m.match_id = p.match_id
    WHERE p.summoner_name = ?1
)
SELECT match_id,
       gold_per_minute,
       AVG(gold_per_minute)
           OVER (ORDER BY game_creation ROWS BETWEEN 19 PRECEDING AND CURRENT ROW) AS ma,
       AVG(gold_per_minute * gold_per_minute)
           OVER (ORDER BY game_creation ROWS BETWEEN 19 PRECEDING AND CURRENT ROW) AS ma_sq,
       COUNT(*)
           OVER (ORDER BY game_creation ROWS BETWEEN 19 PRECEDING AND CURRENT ROW) AS samples
FROM series
ORDER BY game_creation
LIMIT ?2
"#;

/// Most recent stored matches for a summoner, newest first.
pub const MATCH_HISTORY: &str = r#"
SELECT p.match_id, p.puuid, p.summoner_name, p.champion_name,
       p.kills, p.deaths, p.assists,
       p.gold_earned, p.total_damage_dealt, p.vision_score,
       p.kda_ratio, p.gold_per_minute, p.damage_per_minute,
       p.vision_score_per_minute, p.win
FROM participants p
JOIN matches m ON m.match_id = p.match_id
WHERE p.summoner_name = ?1
ORDER BY m.game_creation DESC
LIMIT ?2
"#;

/// Average performance metrics over every stored match of a summoner.
pub const PLAYER_STATS: &str = r#"
SELECT COUNT(*) AS games_played,
       AVG(kda_ratio) AS avg_kda,
       AVG(gold_per_minute) AS avg_gold_per_minute,
       AVG(damage_per_minute) AS avg_damage_per_minute,
       AVG(vision_score_per_minute) AS avg_vision_per_minute,
       AVG(CAST(win AS REAL)) AS win_rate
FROM participants
WHERE summoner_name = ?1
HAVING COUNT(*) > 0
"#;

/// Per-champion aggregates for a summoner, most played first.
pub const CHAMPION_PERFORMANCE: &str = r#"
SELECT champion_name,
       COUNT(*) AS games_played,
       AVG(kda_ratio) AS avg_kda,
       AVG(CAST(win AS REAL)) AS win_rate
FROM participants
WHERE summoner_name = ?1
GROUP BY champion_name
ORDER BY games_played DESC, champion_name
"#;
