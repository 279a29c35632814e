//! Recording results for group and bracket matches.

use crate::error::{Result, TournamentError};
use crate::logic::bracket::advance_winner;
use crate::logic::lifecycle::{ensure_allowed, Action};
use crate::models::{BracketMatch, BracketMatchId, GroupMatch, GroupMatchId, PlayerId, TournamentId};
use crate::store::Database;

/// Largest score accepted for one side of a match.
pub const MAX_SCORE: u32 = 999;

fn check_score(score: Option<u32>) -> Result<Option<u32>> {
    match score {
        Some(s) if s > MAX_SCORE => Err(TournamentError::Validation(format!(
            "Score must be between 0 and {MAX_SCORE} (got {s})"
        ))),
        _ => Ok(score),
    }
}

/// Higher score wins; a tie or a missing score leaves the winner unset.
pub fn decide_winner(
    p1: Option<PlayerId>,
    p2: Option<PlayerId>,
    p1_score: Option<u32>,
    p2_score: Option<u32>,
) -> Option<PlayerId> {
    match (p1_score, p2_score) {
        (Some(a), Some(b)) if a > b => p1,
        (Some(a), Some(b)) if b > a => p2,
        _ => None,
    }
}

/// Form-style score field: blank clears, otherwise an integer in `0..=MAX_SCORE`.
pub fn parse_score(raw: &str) -> Result<Option<u32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let score = raw
        .parse()
        .map_err(|_| TournamentError::Validation(format!("Invalid score: {raw:?}")))?;
    check_score(Some(score))
}

pub fn tournament_of_group_match(db: &Database, match_id: GroupMatchId) -> Result<TournamentId> {
    let m = db.group_match(match_id)?;
    Ok(db.group(m.group_id)?.tournament_id)
}

pub fn tournament_of_bracket_match(db: &Database, match_id: BracketMatchId) -> Result<TournamentId> {
    Ok(db.bracket_match(match_id)?.tournament_id)
}

/// Set (or clear, with `None`) both scores of a group match and derive the winner.
pub fn record_group_score(
    db: &mut Database,
    match_id: GroupMatchId,
    p1_score: Option<u32>,
    p2_score: Option<u32>,
) -> Result<GroupMatch> {
    let tournament_id = tournament_of_group_match(db, match_id)?;
    ensure_allowed(db.tournament(tournament_id)?, Action::ScoreGroupMatch)?;
    let (p1_score, p2_score) = (check_score(p1_score)?, check_score(p2_score)?);

    let m = db.group_match_mut(match_id)?;
    m.p1_score = p1_score;
    m.p2_score = p2_score;
    m.winner = decide_winner(Some(m.p1), Some(m.p2), p1_score, p2_score);
    Ok(m.clone())
}

/// Set (or clear) both scores of a bracket match and push the winner into the next round.
///
/// Byes and matches still waiting for an opponent cannot be scored.
pub fn record_bracket_score(
    db: &mut Database,
    match_id: BracketMatchId,
    p1_score: Option<u32>,
    p2_score: Option<u32>,
) -> Result<BracketMatch> {
    let tournament_id = tournament_of_bracket_match(db, match_id)?;
    ensure_allowed(db.tournament(tournament_id)?, Action::ScoreBracketMatch)?;
    let (p1_score, p2_score) = (check_score(p1_score)?, check_score(p2_score)?);

    let m = db.bracket_match_mut(match_id)?;
    if !m.has_both_players() {
        return Err(TournamentError::Validation(
            "Both players must be known before a score can be recorded".into(),
        ));
    }
    m.p1_score = p1_score;
    m.p2_score = p2_score;
    m.winner = decide_winner(m.p1, m.p2, p1_score, p2_score);
    let next = m.next;
    let winner = m.winner;

    if let Some(next) = next {
        advance_winner(db, tournament_id, next, winner)?;
    }
    Ok(db.bracket_match(match_id)?.clone())
}
