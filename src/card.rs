use futures_util::future::join_all;
use tracing::{instrument, warn};

use crate::error::AppError;
use crate::models::{AchievementSet, Game, Locale, PersonaStatus, SteamCard};
use crate::steam::SteamApi;

/// How many owned games, from the front of the list, get achievements.
pub const ACHIEVEMENT_GAMES: usize = 3;

#[derive(Debug, Clone)]
pub struct CardService<S> {
    steam: S,
    locale: Locale,
}

impl<S: SteamApi> CardService<S> {
    pub fn new(steam: S, locale: Locale) -> Self {
        Self { steam, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Builds the card for `steamid`.
    ///
    /// Fails with [`AppError::NotFound`] when Steam knows no such player, and
    /// with an upstream error when the profile or owned games lookup fails.
    /// Recently played games and achievements are best effort and come back
    /// empty instead of failing the card.
    #[instrument(skip(self))]
    pub async fn build_card(&self, steamid: &str) -> Result<SteamCard, AppError> {
        let mut players = self.steam.player_summaries(steamid).await?;
        if players.is_empty() {
            return Err(AppError::NotFound(self.locale.user_not_found().to_string()));
        }
        let player = players.swap_remove(0);

        let (owned, recent) = tokio::join!(
            self.steam.owned_games(steamid),
            self.steam.recently_played_games(steamid),
        );
        let games_owned = owned?;
        let recently_played = recent.unwrap_or_else(|err| {
            warn!(code = err.code(), error = %err, "recently played lookup failed");
            Vec::new()
        });

        let achievements = self.achievements(steamid, &games_owned).await;
        let status = PersonaStatus::from_persona_state(player.personastate);

        Ok(SteamCard {
            avatar: player.avatarfull,
            username: player.personaname,
            profile_url: player.profileurl,
            real_name: player.realname,
            country: player.loccountrycode,
            status: self.locale.status_label(status),
            games_owned,
            recently_played,
            achievements,
        })
    }

    async fn achievements(&self, steamid: &str, games: &[Game]) -> AchievementSet {
        let mut appids = Vec::with_capacity(ACHIEVEMENT_GAMES);
        for game in games.iter().take(ACHIEVEMENT_GAMES) {
            if !appids.contains(&game.appid) {
                appids.push(game.appid);
            }
        }

        let lookups = appids.into_iter().map(|appid| async move {
            let achievements = self
                .steam
                .player_achievements(steamid, appid)
                .await
                .unwrap_or_else(|err| {
                    warn!(appid, code = err.code(), error = %err, "achievements lookup failed");
                    Vec::new()
                });
            (appid, achievements)
        });

        join_all(lookups).await.into_iter().collect()
    }
}
