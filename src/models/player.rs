//! Player profile (owned by the player directory) and the NTRP-style skill level.

use crate::error::TournamentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Identifier of a site account (tournament creator, player owner).
pub type UserId = Uuid;

/// Skill rating on the 1.0–7.0 scale in 0.5 steps, stored as half steps.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "LevelRepr", into = "f64")]
pub struct Level(u8);

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Number(f64),
    Text(String),
}

impl Level {
    pub const MIN: Level = Level(2);
    pub const MAX: Level = Level(14);

    /// Build a level from a number such as `4.5`.
    pub fn from_f64(value: f64) -> Result<Self, TournamentError> {
        let doubled = value * 2.0;
        let halves = doubled.round();
        if !value.is_finite() || (doubled - halves).abs() > 1e-9 {
            return Err(invalid_level(value));
        }
        if halves < f64::from(Self::MIN.0) || halves > f64::from(Self::MAX.0) {
            return Err(invalid_level(value));
        }
        Ok(Level(halves as u8))
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

fn invalid_level(value: impl fmt::Display) -> TournamentError {
    TournamentError::Validation(format!(
        "level must be a number like 5.0 / 5.5 / 6.0 between 1.0 and 7.0 (got {value})"
    ))
}

impl FromStr for Level {
    type Err = TournamentError;

    /// Accepts `5.5` as well as `5,5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(',', ".");
        let value: f64 = normalized.parse().map_err(|_| invalid_level(s.trim()))?;
        Self::from_f64(value)
    }
}

impl TryFrom<LevelRepr> for Level {
    type Error = TournamentError;

    fn try_from(repr: LevelRepr) -> Result<Self, Self::Error> {
        match repr {
            LevelRepr::Number(n) => Level::from_f64(n),
            LevelRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Level> for f64 {
    fn from(level: Level) -> f64 {
        level.as_f64()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 2, if self.0 % 2 == 1 { 5 } else { 0 })
    }
}

/// A player profile. Owned by the directory; tournaments only reference the id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Account that owns this profile, if any.
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub level: Option<Level>,
}

impl Player {
    /// Create a new player with a fresh id and no owning account.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        level: Option<Level>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            level,
        }
    }

    /// Attach the profile to an account.
    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
