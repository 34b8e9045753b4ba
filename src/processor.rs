//! Pure transformation of a fetched match into warehouse rows. No I/O:
//! deterministic given the same input.

use crate::db::{MatchRow, ParticipantRow};
use crate::riot::types::MatchDto;

/// Flattens a match payload into one `MatchRow` plus one `ParticipantRow` per
/// participant, computing the derived metrics along the way:
/// KDA = (kills + assists) / max(deaths, 1), and per-minute rates against the
/// game duration in minutes.
pub fn flatten_match(data: &MatchDto) -> (MatchRow, Vec<ParticipantRow>) {
    let match_id = &data.metadata.match_id;
    let minutes = data.info.game_duration as f64 / 60.0;

    let match_row = MatchRow {
        match_id: match_id.clone(),
        game_creation: data.info.game_creation,
        game_duration: data.info.game_duration,
        game_mode: data.info.game_mode.clone(),
        game_type: data.info.game_type.clone(),
        queue_id: data.info.queue_id,
    };

    let participants = data
        .info
        .participants
        .iter()
        .map(|p| ParticipantRow {
            match_id: match_id.clone(),
            puuid: p.puuid.clone(),
            summoner_name: p.display_name().to_string(),
            champion_name: p.champion_name.clone(),
            kills: p.kills,
            deaths: p.deaths,
            assists: p.assists,
            gold_earned: p.gold_earned,
            total_damage_dealt: p.total_damage_dealt_to_champions,
            vision_score: p.vision_score,
            kda_ratio: (p.kills + p.assists) as f64 / p.deaths.max(1) as f64,
            gold_per_minute: per_minute(p.gold_earned, minutes),
            damage_per_minute: per_minute(p.total_damage_dealt_to_champions, minutes),
            vision_score_per_minute: per_minute(p.vision_score, minutes),
            win: p.win,
        })
        .collect();

    (match_row, participants)
}

fn per_minute(total: i64, minutes: f64) -> f64 {
    if minutes <= 0.0 {
        return 0.0;
    }
    total as f64 / minutes
}
