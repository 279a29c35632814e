//! Data structures: players, tournaments, groups, bracket matches.

mod bracket;
mod group;
mod player;
mod tournament;

pub use bracket::{feeding_side, BracketMatch, BracketMatchId, NextSlot, Side};
pub use group::{group_code, Group, GroupId, GroupMatch, GroupMatchId};
pub use player::{Level, Player, PlayerId, UserId};
pub use tournament::{Caller, Format, Stage, Tournament, TournamentDraft, TournamentId};
