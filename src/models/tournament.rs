//! Tournament, its declared format, and its lifecycle stage.

use crate::error::{Result, TournamentError};
use crate::models::player::{Level, PlayerId, UserId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

const MAX_TEXT_LEN: usize = 120;

/// Declared capacity of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Format {
    #[default]
    Sixteen,
    ThirtyTwo,
    SixtyFour,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Sixteen, Format::ThirtyTwo, Format::SixtyFour];

    pub fn max_players(self) -> u32 {
        match self {
            Format::Sixteen => 16,
            Format::ThirtyTwo => 32,
            Format::SixtyFour => 64,
        }
    }
}

impl TryFrom<u32> for Format {
    type Error = TournamentError;

    fn try_from(value: u32) -> Result<Self> {
        Format::ALL
            .into_iter()
            .find(|f| f.max_players() == value)
            .ok_or_else(|| {
                TournamentError::Validation(format!(
                    "format must be 16, 32 or 64 (got {value})"
                ))
            })
    }
}

impl From<Format> for u32 {
    fn from(format: Format) -> u32 {
        format.max_players()
    }
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Players join and withdraw; nothing generated yet.
    #[default]
    Registration,
    /// Round-robin groups exist.
    Groups,
    /// Single-elimination bracket exists.
    Knockout,
    /// Organizer closed the tournament after the final.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Registration => "registration",
            Stage::Groups => "groups",
            Stage::Knockout => "knockout",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Who is performing an action. Identity is established outside this crate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Caller {
    pub user_id: Option<UserId>,
    pub is_superuser: bool,
}

impl Caller {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            is_superuser: false,
        }
    }

    pub fn superuser(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            is_superuser: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Organizer-supplied fields for creating or editing a tournament.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TournamentDraft {
    pub name: String,
    pub location: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    pub format: Format,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub min_level: Option<Level>,
    #[serde(default)]
    pub max_level: Option<Level>,
}

impl TournamentDraft {
    fn validate(mut self) -> Result<Self> {
        self.name = required_text("name", &self.name)?;
        self.location = required_text("location", &self.location)?;
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let (Some(min), Some(max)) = (self.min_level, self.max_level) {
            if min > max {
                return Err(TournamentError::Validation(
                    "minimum level cannot be greater than maximum level".into(),
                ));
            }
        }
        Ok(self)
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(TournamentError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub format: Format,
    pub description: Option<String>,
    /// Inclusive bounds; `None` leaves that side open.
    pub min_level: Option<Level>,
    pub max_level: Option<Level>,
    pub creator: UserId,
    pub stage: Stage,
    /// Registered players (membership only).
    pub players: BTreeSet<PlayerId>,
}

impl Tournament {
    /// Create a tournament in Registration with no players.
    pub fn new(draft: TournamentDraft, creator: UserId) -> Result<Self> {
        let draft = draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name,
            location: draft.location,
            date: draft.date,
            time: draft.time,
            format: draft.format,
            description: draft.description,
            min_level: draft.min_level,
            max_level: draft.max_level,
            creator,
            stage: Stage::Registration,
            players: BTreeSet::new(),
        })
    }

    /// Replace the editable fields. Players and stage are untouched.
    pub fn apply(&mut self, draft: TournamentDraft) -> Result<()> {
        let draft = draft.validate()?;
        if self.players.len() > draft.format.max_players() as usize {
            return Err(TournamentError::Capacity {
                format: draft.format.max_players(),
            });
        }
        self.name = draft.name;
        self.location = draft.location;
        self.date = draft.date;
        self.time = draft.time;
        self.format = draft.format;
        self.description = draft.description;
        self.min_level = draft.min_level;
        self.max_level = draft.max_level;
        Ok(())
    }

    pub fn can_manage(&self, caller: &Caller) -> bool {
        caller.is_superuser || caller.user_id == Some(self.creator)
    }

    pub fn ensure_can_manage(&self, caller: &Caller) -> Result<()> {
        if self.can_manage(caller) {
            Ok(())
        } else {
            Err(TournamentError::Unauthorized)
        }
    }

    pub fn is_open(&self) -> bool {
        self.players.len() < self.format.max_players() as usize
    }

    pub fn is_level_restricted(&self) -> bool {
        self.min_level.is_some() || self.max_level.is_some()
    }

    /// True when `level` lies in the (possibly open) allowed range.
    pub fn admits_level(&self, level: Level) -> bool {
        self.min_level.map_or(true, |min| level >= min)
            && self.max_level.map_or(true, |max| level <= max)
    }

    /// Join-time rating check.
    pub fn check_eligibility(&self, level: Option<Level>) -> Result<()> {
        if !self.is_level_restricted() {
            return Ok(());
        }
        let level = level.ok_or_else(|| {
            TournamentError::Eligibility(
                "Set your level in your player profile to join this tournament".into(),
            )
        })?;
        if let Some(min) = self.min_level.filter(|min| level < *min) {
            return Err(TournamentError::Eligibility(format!(
                "Minimum tournament level is {min}, yours is {level}"
            )));
        }
        if let Some(max) = self.max_level.filter(|max| level > *max) {
            return Err(TournamentError::Eligibility(format!(
                "Maximum tournament level is {max}, yours is {level}"
            )));
        }
        Ok(())
    }

    /// Human-readable level range, e.g. "from 3.0" or "3.0 – 4.5".
    pub fn level_range_display(&self) -> String {
        match (self.min_level, self.max_level) {
            (None, None) => "any".to_string(),
            (None, Some(max)) => format!("up to {max}"),
            (Some(min), None) => format!("from {min}"),
            (Some(min), Some(max)) => format!("{min} – {max}"),
        }
    }
}
