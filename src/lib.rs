//! Builds a "Steam card" for a Steam ID: profile, owned and recently played
//! games, and achievements for the first few owned games, served as JSON over
//! HTTP.

pub mod card;
pub mod cli;
pub mod error;
pub mod http;
pub mod logging;
pub mod models;
pub mod steam;
#[cfg(test)]
mod testing;
