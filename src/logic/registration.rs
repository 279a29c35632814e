//! Registration: players join and withdraw until the tournament is done.
//!
//! A change after groups or the bracket exist only affects the roster; the organizer
//! regenerates the stage to take it into account.

use crate::error::{Result, TournamentError};
use crate::logic::lifecycle::{ensure_allowed, Action};
use crate::models::{Caller, PlayerId, TournamentId};
use crate::store::Database;
use serde::Serialize;

/// What a roster change actually did.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterChange {
    Joined,
    AlreadyRegistered,
    Left,
    NotRegistered,
}

/// Add `player_id` to the tournament.
///
/// Checks, in order: stage, already registered (no-op), capacity, level range.
pub fn register_player(
    db: &mut Database,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<RosterChange> {
    let level = db.player(player_id)?.level;
    let tournament = db.tournament_mut(tournament_id)?;
    ensure_allowed(tournament, Action::ChangeRoster)?;
    if tournament.players.contains(&player_id) {
        return Ok(RosterChange::AlreadyRegistered);
    }
    if !tournament.is_open() {
        return Err(TournamentError::Capacity {
            format: tournament.format.max_players(),
        });
    }
    tournament.check_eligibility(level)?;
    tournament.players.insert(player_id);
    Ok(RosterChange::Joined)
}

/// Remove `player_id` from the tournament (no-op if not registered).
pub fn withdraw_player(
    db: &mut Database,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<RosterChange> {
    db.player(player_id)?;
    let tournament = db.tournament_mut(tournament_id)?;
    ensure_allowed(tournament, Action::ChangeRoster)?;
    if tournament.players.remove(&player_id) {
        Ok(RosterChange::Left)
    } else {
        Ok(RosterChange::NotRegistered)
    }
}

/// The caller's own player profile.
pub fn own_player(db: &Database, caller: &Caller) -> Result<PlayerId> {
    let user_id = caller.user_id.ok_or(TournamentError::Unauthorized)?;
    db.player_for_user(user_id)
        .map(|p| p.id)
        .ok_or_else(|| TournamentError::Validation("You do not have a player profile".into()))
}

/// A player may change their own registration; organizers may change anyone's.
pub fn ensure_can_change_roster(
    db: &Database,
    caller: &Caller,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<()> {
    let owns_profile = caller
        .user_id
        .is_some_and(|uid| db.player(player_id).is_ok_and(|p| p.user_id == Some(uid)));
    if owns_profile {
        return Ok(());
    }
    db.tournament(tournament_id)?.ensure_can_manage(caller)
}
