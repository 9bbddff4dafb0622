use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Language used for the status label and the error messages sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Locale {
    Es,
    En,
}

impl Locale {
    pub fn status_label(self, status: PersonaStatus) -> &'static str {
        match (self, status) {
            (Self::Es, PersonaStatus::Online) => "En línea",
            (Self::Es, PersonaStatus::Offline) => "Desconectado",
            (Self::En, PersonaStatus::Online) => "Online",
            (Self::En, PersonaStatus::Offline) => "Offline",
        }
    }

    pub fn user_not_found(self) -> &'static str {
        match self {
            Self::Es => "Usuario no encontrado",
            Self::En => "User not found",
        }
    }

    pub fn internal_error(self) -> &'static str {
        match self {
            Self::Es => "Error interno del servidor",
            Self::En => "Internal server error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaStatus {
    Online,
    Offline,
}

impl PersonaStatus {
    /// Steam reports `personastate == 1` for online; busy, away, snooze and
    /// friends all count as offline here.
    pub fn from_persona_state(state: i64) -> Self {
        if state == 1 {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

/// One entry of `GetPlayerSummaries`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSummary {
    pub avatarfull: String,
    pub personaname: String,
    pub profileurl: String,
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default)]
    pub loccountrycode: Option<String>,
    pub personastate: i64,
}

/// A game from the owned or recently played lists. Everything besides the
/// appid is passed through to clients untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub appid: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub apiname: String,
    pub achieved: u8,
    pub unlocktime: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Achievements keyed by appid, kept in the order the games were looked up.
/// Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementSet(Vec<(i64, Vec<Achievement>)>);

#[cfg(test)]
impl AchievementSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn appids(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().map(|(appid, _)| *appid)
    }

    pub fn get(&self, appid: i64) -> Option<&[Achievement]> {
        self.0
            .iter()
            .find(|(id, _)| *id == appid)
            .map(|(_, achievements)| achievements.as_slice())
    }
}

impl FromIterator<(i64, Vec<Achievement>)> for AchievementSet {
    fn from_iter<I: IntoIterator<Item = (i64, Vec<Achievement>)>>(iter: I) -> Self {
        let mut entries: Vec<(i64, Vec<Achievement>)> = Vec::new();
        for (appid, achievements) in iter {
            if !entries.iter().any(|(id, _)| *id == appid) {
                entries.push((appid, achievements));
            }
        }
        Self(entries)
    }
}

impl Serialize for AchievementSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(appid, achievements)| (appid, achievements)))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamCard {
    pub avatar: String,
    pub username: String,
    pub profile_url: String,
    pub real_name: Option<String>,
    pub country: Option<String>,
    pub status: &'static str,
    pub games_owned: Vec<Game>,
    pub recently_played: Vec<Game>,
    pub achievements: AchievementSet,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persona_state_one_is_the_only_online_state() {
        assert_eq!(PersonaStatus::from_persona_state(1), PersonaStatus::Online);
        for state in [0, 2, 3, 4, 5, 6, -1] {
            assert_eq!(
                PersonaStatus::from_persona_state(state),
                PersonaStatus::Offline
            );
        }
    }

    #[test]
    fn achievement_set_serializes_in_lookup_order() {
        let set: AchievementSet = [(730, Vec::new()), (440, Vec::new()), (570, Vec::new())]
            .into_iter()
            .collect();

        let text = serde_json::to_string(&set).unwrap();
        assert_eq!(text, r#"{"730":[],"440":[],"570":[]}"#);
    }

    #[test]
    fn achievement_set_keeps_first_entry_per_appid() {
        let set: AchievementSet = [
            (10, vec![achievement_named("FIRST")]),
            (10, vec![achievement_named("SECOND")]),
            (20, Vec::new()),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(10).unwrap()[0].apiname, "FIRST");
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"10":[{"apiname":"FIRST","achieved":1,"unlocktime":0}],"20":[]}"#
        );
    }

    fn achievement_named(apiname: &str) -> Achievement {
        serde_json::from_value(json!({ "apiname": apiname, "achieved": 1, "unlocktime": 0 }))
            .unwrap()
    }

    #[test]
    fn player_without_persona_state_is_rejected() {
        let raw = json!({
            "personaname": "Rabscuttle",
            "profileurl": "https://steamcommunity.com/id/rabscuttle/",
            "avatarfull": "https://avatars.steamstatic.com/full.jpg"
        });
        assert!(serde_json::from_value::<PlayerSummary>(raw).is_err());
    }

    #[test]
    fn game_keeps_unknown_upstream_fields() {
        let raw = json!({
            "appid": 730,
            "name": "Counter-Strike 2",
            "playtime_forever": 1234,
            "img_icon_url": "abc"
        });

        let game: Game = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(game.appid, 730);
        assert_eq!(serde_json::to_value(&game).unwrap(), raw);
    }

    #[test]
    fn game_without_appid_is_rejected() {
        let raw = json!({ "name": "Mystery" });
        assert!(serde_json::from_value::<Game>(raw).is_err());
    }

    #[test]
    fn card_uses_camel_case_field_names() {
        let card = SteamCard {
            avatar: "https://avatars/full.jpg".to_string(),
            username: "gabe".to_string(),
            profile_url: "https://steamcommunity.com/id/gabe".to_string(),
            real_name: None,
            country: Some("US".to_string()),
            status: Locale::En.status_label(PersonaStatus::Online),
            games_owned: Vec::new(),
            recently_played: Vec::new(),
            achievements: AchievementSet::default(),
        };

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["profileUrl"], "https://steamcommunity.com/id/gabe");
        assert_eq!(value["realName"], Value::Null);
        assert_eq!(value["country"], "US");
        assert_eq!(value["status"], "Online");
        assert_eq!(value["gamesOwned"], json!([]));
        assert_eq!(value["recentlyPlayed"], json!([]));
        assert_eq!(value["achievements"], json!({}));
    }
}
