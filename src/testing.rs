//! In-memory Steam upstream shared by the aggregation and routing tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::json;

use crate::error::AppError;
use crate::models::{Achievement, Game, PlayerSummary};
use crate::steam::SteamApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PlayerSummaries,
    OwnedGames,
    RecentlyPlayed,
    Achievements(i64),
}

/// Each lookup answers from its field; `None` (or a missing appid for
/// achievements) answers with an upstream failure.
#[derive(Debug, Default)]
pub struct FakeSteam {
    pub players: Option<Vec<PlayerSummary>>,
    pub owned: Option<Vec<Game>>,
    pub recent: Option<Vec<Game>>,
    pub achievements: HashMap<i64, Vec<Achievement>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeSteam {
    /// One player owning `owned`, no recent games, no achievements.
    pub fn with_player(personastate: i64, owned: Vec<Game>) -> Self {
        Self {
            players: Some(vec![player(personastate)]),
            owned: Some(owned),
            recent: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn achievement_calls(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Achievements(appid) => Some(appid),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn unavailable(what: &str) -> AppError {
    AppError::UpstreamUnavailable(format!("{what} returned 503 Service Unavailable"))
}

impl SteamApi for FakeSteam {
    async fn player_summaries(&self, _steamid: &str) -> Result<Vec<PlayerSummary>, AppError> {
        self.record(Call::PlayerSummaries);
        self.players.clone().ok_or_else(|| unavailable("player summaries"))
    }

    async fn owned_games(&self, _steamid: &str) -> Result<Vec<Game>, AppError> {
        self.record(Call::OwnedGames);
        self.owned.clone().ok_or_else(|| unavailable("owned games"))
    }

    async fn recently_played_games(&self, _steamid: &str) -> Result<Vec<Game>, AppError> {
        self.record(Call::RecentlyPlayed);
        self.recent.clone().ok_or_else(|| unavailable("recently played"))
    }

    async fn player_achievements(
        &self,
        _steamid: &str,
        appid: i64,
    ) -> Result<Vec<Achievement>, AppError> {
        self.record(Call::Achievements(appid));
        self.achievements
            .get(&appid)
            .cloned()
            .ok_or_else(|| unavailable("achievements"))
    }
}

pub fn player(personastate: i64) -> PlayerSummary {
    serde_json::from_value(json!({
        "steamid": "76561197960287930",
        "personaname": "Rabscuttle",
        "profileurl": "https://steamcommunity.com/id/rabscuttle/",
        "avatarfull": "https://avatars.steamstatic.com/rabscuttle_full.jpg",
        "realname": "Robin Walker",
        "loccountrycode": "US",
        "personastate": personastate
    }))
    .unwrap()
}

pub fn game(appid: i64) -> Game {
    serde_json::from_value(json!({
        "appid": appid,
        "name": format!("Game {appid}"),
        "playtime_forever": appid * 10,
        "playtime_2weeks": 5
    }))
    .unwrap()
}

pub fn games(appids: &[i64]) -> Vec<Game> {
    appids.iter().copied().map(game).collect()
}

pub fn achievement(apiname: &str, achieved: bool) -> Achievement {
    serde_json::from_value(json!({
        "apiname": apiname,
        "achieved": u8::from(achieved),
        "unlocktime": if achieved { 1_700_000_000 } else { 0 }
    }))
    .unwrap()
}
