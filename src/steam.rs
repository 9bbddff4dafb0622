use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::error::AppError;
use crate::models::{Achievement, Game, PlayerSummary};

pub const DEFAULT_BASE_URL: &str = "https://api.steampowered.com";

const PLAYER_SUMMARIES: &str = "ISteamUser/GetPlayerSummaries/v0002/";
const OWNED_GAMES: &str = "IPlayerService/GetOwnedGames/v1/";
const RECENTLY_PLAYED_GAMES: &str = "IPlayerService/GetRecentlyPlayedGames/v1/";
const PLAYER_ACHIEVEMENTS: &str = "ISteamUserStats/GetPlayerAchievements/v1/";

/// The four Steam Web API lookups a card is built from.
pub trait SteamApi: Send + Sync {
    fn player_summaries(
        &self,
        steamid: &str,
    ) -> impl Future<Output = Result<Vec<PlayerSummary>, AppError>> + Send;

    fn owned_games(&self, steamid: &str) -> impl Future<Output = Result<Vec<Game>, AppError>> + Send;

    fn recently_played_games(
        &self,
        steamid: &str,
    ) -> impl Future<Output = Result<Vec<Game>, AppError>> + Send;

    fn player_achievements(
        &self,
        steamid: &str,
        appid: i64,
    ) -> impl Future<Output = Result<Vec<Achievement>, AppError>> + Send;
}

#[derive(Clone)]
pub struct SteamClient {
    http: reqwest::Client,
    api_key: Arc<str>,
    base_url: Url,
}

impl fmt::Debug for SteamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteamClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SteamClient {
    pub fn new(
        api_key: impl Into<Arc<str>>,
        mut base_url: Url,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        // `Url::join` replaces the last segment unless the base ends in `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url,
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, AppError> {
        let mut url = self.base_url.join(path)?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("key", &self.api_key);
            for (name, value) in params {
                qp.append_pair(name, value);
            }
            qp.append_pair("format", "json");
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, url: Url) -> Result<T, AppError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "{path} returned {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::UpstreamSchema(format!("{path}: {}", e.without_url())))
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
struct Envelope<T> {
    #[serde(default)]
    response: T,
}

#[derive(Debug, Default, Deserialize)]
struct PlayersBody {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Default, Deserialize)]
struct GamesBody {
    #[serde(default)]
    games: Vec<Game>,
}

#[derive(Debug, Default, Deserialize)]
struct StatsEnvelope {
    #[serde(default)]
    playerstats: StatsBody,
}

#[derive(Debug, Default, Deserialize)]
struct StatsBody {
    #[serde(default)]
    achievements: Vec<Achievement>,
}

impl SteamApi for SteamClient {
    #[instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn player_summaries(&self, steamid: &str) -> Result<Vec<PlayerSummary>, AppError> {
        let url = self.url(PLAYER_SUMMARIES, &[("steamids", steamid)])?;
        let body: Envelope<PlayersBody> = self.fetch(PLAYER_SUMMARIES, url).await?;
        Ok(body.response.players)
    }

    #[instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn owned_games(&self, steamid: &str) -> Result<Vec<Game>, AppError> {
        let url = self.url(
            OWNED_GAMES,
            &[
                ("steamid", steamid),
                ("include_appinfo", "true"),
                ("include_played_free_games", "true"),
            ],
        )?;
        let body: Envelope<GamesBody> = self.fetch(OWNED_GAMES, url).await?;
        Ok(body.response.games)
    }

    #[instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn recently_played_games(&self, steamid: &str) -> Result<Vec<Game>, AppError> {
        let url = self.url(RECENTLY_PLAYED_GAMES, &[("steamid", steamid)])?;
        let body: Envelope<GamesBody> = self.fetch(RECENTLY_PLAYED_GAMES, url).await?;
        Ok(body.response.games)
    }

    #[instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn player_achievements(
        &self,
        steamid: &str,
        appid: i64,
    ) -> Result<Vec<Achievement>, AppError> {
        let appid = appid.to_string();
        let url = self.url(
            PLAYER_ACHIEVEMENTS,
            &[("steamid", steamid), ("appid", appid.as_str())],
        )?;
        let body: StatsEnvelope = self.fetch(PLAYER_ACHIEVEMENTS, url).await?;
        Ok(body.playerstats.achievements)
    }
}
