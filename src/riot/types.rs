use serde::Deserialize;

/// Representation of the Account-V1 response.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
}

/// Representation of the Summoner-V4 response.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub id: String,
    pub puuid: String,
    #[serde(default)]
    pub summoner_level: u32,
}

/// Representation of the Match-V5 match response.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub metadata: MetadataDto,
    pub info: InfoDto,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDto {
    pub match_id: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InfoDto {
    pub game_creation: i64,
    pub game_duration: i64,
    pub game_mode: String,
    pub game_type: String,
    pub queue_id: i64,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    #[serde(default)]
    pub summoner_name: String,
    #[serde(default)]
    pub riot_id_game_name: String,
    pub champion_name: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub gold_earned: i64,
    pub total_damage_dealt_to_champions: i64,
    pub vision_score: i64,
    pub win: bool,
}

impl ParticipantDto {
    /// Newer match payloads leave `summonerName` empty and carry the riot id
    /// instead.
    pub fn display_name(&self) -> &str {
        if self.summoner_name.is_empty() {
            &self.riot_id_game_name
        } else {
            &self.summoner_name
        }
    }
}

/// Representation of the Spectator-V4 active game response.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameDto {
    pub game_id: i64,
    pub game_mode: String,
    #[serde(default)]
    pub game_length: i64,
    #[serde(default)]
    pub game_start_time: i64,
    pub platform_id: String,
    pub participants: Vec<CurrentGameParticipantDto>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameParticipantDto {
    #[serde(default)]
    pub puuid: String,
    #[serde(default)]
    pub summoner_name: String,
    pub champion_id: i64,
    pub team_id: i64,
}
