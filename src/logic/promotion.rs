//! Promotion: top finishers of each group become the knockout seeds.

use crate::error::{Result, TournamentError};
use crate::logic::bracket::{build_bracket, Seeding};
use crate::logic::lifecycle::{ensure_allowed, Action};
use crate::logic::standings::group_standings;
use crate::models::{BracketMatchId, PlayerId, TournamentId};
use crate::store::Database;
use rand::Rng;

pub const DEFAULT_TAKE: usize = 2;

/// Top `take` players of every group, groups in code order, each group in standings order.
///
/// The order is the seed ranking, so with three or more groups A's runner-up is seeded above
/// B's winner and takes a bye first.
pub fn select_qualifiers(
    db: &Database,
    tournament_id: TournamentId,
    take: usize,
) -> Result<Vec<PlayerId>> {
    let mut seeds = Vec::new();
    for group in db.groups_of(tournament_id) {
        let table = group_standings(db, group.id)?;
        seeds.extend(table.into_iter().take(take).map(|row| row.player));
    }
    Ok(seeds)
}

/// Replace the roster with the qualifiers and build a bracket that keeps their ranking.
pub fn promote_to_knockout<R: Rng + ?Sized>(
    db: &mut Database,
    tournament_id: TournamentId,
    take: usize,
    rng: &mut R,
) -> Result<Vec<BracketMatchId>> {
    if take == 0 {
        return Err(TournamentError::Validation(
            "At least one player per group must advance".into(),
        ));
    }
    ensure_allowed(db.tournament(tournament_id)?, Action::Promote)?;

    let seeds = select_qualifiers(db, tournament_id, take)?;
    db.tournament_mut(tournament_id)?.players = seeds.iter().copied().collect();
    build_bracket(db, tournament_id, Seeding::Ranked(&seeds), rng)
}
