//! Knockout stage: single-elimination bracket of any size, padded with byes.

use crate::error::Result;
use crate::logic::lifecycle::{transition, Action};
use crate::models::{
    feeding_side, BracketMatch, BracketMatchId, NextSlot, PlayerId, Side, TournamentId,
};
use crate::store::Database;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Smallest power of two >= `n` (1 for 0 or 1).
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Number of rounds in a bracket of `size` entries.
pub fn round_count(size: usize) -> u32 {
    next_power_of_two(size).trailing_zeros()
}

/// Bracket position of each seed rank (1-based) for a bracket of `size` entries:
/// 1 meets `size`, 2 meets `size - 1`, and the top two seeds sit in opposite halves.
pub fn seed_positions(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}

/// How players are placed into round 1.
#[derive(Clone, Copy, Debug)]
pub enum Seeding<'a> {
    /// All registered players, padded with byes, then shuffled.
    Shuffled,
    /// Explicit ranking (best first); byes go to the best seeds.
    Ranked(&'a [PlayerId]),
}

/// All matches of one round, ordered by slot.
#[derive(Clone, Debug, Serialize)]
pub struct BracketRound {
    pub round_no: u32,
    pub matches: Vec<BracketMatch>,
}

/// (Re)build the knockout bracket.
///
/// Deletes the old bracket and all groups, fills round 1 (byes are `None`), creates empty
/// placeholder matches for every later round down to the single-match final, links each match
/// to the one its winner feeds, and auto-advances players who drew a bye.
/// Moves the tournament to Knockout; with fewer than 2 entrants no matches are built.
pub fn build_bracket<R: Rng + ?Sized>(
    db: &mut Database,
    tournament_id: TournamentId,
    seeding: Seeding<'_>,
    rng: &mut R,
) -> Result<Vec<BracketMatchId>> {
    let tournament = db.tournament(tournament_id)?;
    let next_stage = transition(tournament.stage, Action::GenerateKnockout)?;

    let entries = match seeding {
        Seeding::Shuffled => {
            let players: Vec<PlayerId> = tournament.players.iter().copied().collect();
            let size = next_power_of_two(players.len());
            let mut padded: Vec<Option<PlayerId>> = players.into_iter().map(Some).collect();
            padded.resize(size, None);
            padded.shuffle(rng);
            padded
        }
        Seeding::Ranked(seeds) => {
            let size = next_power_of_two(seeds.len());
            seed_positions(size)
                .into_iter()
                .map(|rank| seeds.get(rank - 1).copied())
                .collect()
        }
    };

    db.delete_bracket(tournament_id);
    db.delete_groups(tournament_id);

    let mut ids = Vec::new();
    if entries.len() >= 2 {
        let rounds = layout_rounds(tournament_id, &entries);
        for m in rounds.iter().flatten() {
            ids.push(db.insert_bracket_match(m.clone()));
        }
        resolve_byes(db, tournament_id)?;
    }

    db.tournament_mut(tournament_id)?.stage = next_stage;
    Ok(ids)
}

/// Round 1 from consecutive pairs of `entries`, then halving placeholder rounds, all linked forward.
fn layout_rounds(tournament_id: TournamentId, entries: &[Option<PlayerId>]) -> Vec<Vec<BracketMatch>> {
    let mut rounds: Vec<Vec<BracketMatch>> = vec![entries
        .chunks_exact(2)
        .zip(1u32..)
        .map(|(pair, slot)| BracketMatch::new(tournament_id, 1, slot, pair[0], pair[1]))
        .collect()];

    let mut round_no = 1;
    while rounds[rounds.len() - 1].len() > 1 {
        round_no += 1;
        let count = rounds[rounds.len() - 1].len() / 2;
        rounds.push(
            (1..=count as u32)
                .map(|slot| BracketMatch::new(tournament_id, round_no, slot, None, None))
                .collect(),
        );
    }

    for r in 0..rounds.len() - 1 {
        let (current, later) = rounds.split_at_mut(r + 1);
        let following = &later[0];
        for m in current[r].iter_mut() {
            let target = &following[((m.slot - 1) / 2) as usize];
            m.next = Some(NextSlot {
                match_id: target.id,
                side: feeding_side(m.slot),
            });
        }
    }
    rounds
}

/// Coordinates of matches that can never have a player: two byes in round 1, or two such feeders.
fn dead_matches(bracket: &[&BracketMatch]) -> HashSet<(u32, u32)> {
    let mut dead: HashSet<(u32, u32)> = bracket
        .iter()
        .filter(|m| m.round_no == 1 && m.p1.is_none() && m.p2.is_none())
        .map(|m| (1, m.slot))
        .collect();
    let last_round = bracket.iter().map(|m| m.round_no).max().unwrap_or(0);
    for r in 2..=last_round {
        for m in bracket.iter().filter(|m| m.round_no == r) {
            if dead.contains(&(r - 1, 2 * m.slot - 1)) && dead.contains(&(r - 1, 2 * m.slot)) {
                dead.insert((r, m.slot));
            }
        }
    }
    dead
}

fn side_is_dead(dead: &HashSet<(u32, u32)>, m: &BracketMatch, side: Side) -> bool {
    if m.round_no == 1 {
        return m.player(side).is_none();
    }
    let feeder = match side {
        Side::P1 => 2 * m.slot - 1,
        Side::P2 => 2 * m.slot,
    };
    dead.contains(&(m.round_no - 1, feeder))
}

fn other(side: Side) -> Side {
    match side {
        Side::P1 => Side::P2,
        Side::P2 => Side::P1,
    }
}

/// Give every round-1 bye its walkover and carry it forward.
fn resolve_byes(db: &mut Database, tournament_id: TournamentId) -> Result<()> {
    let walkovers: Vec<(BracketMatchId, PlayerId)> = db
        .bracket_of(tournament_id)
        .into_iter()
        .filter(|m| m.round_no == 1)
        .filter_map(|m| match (m.p1, m.p2) {
            (Some(p), None) | (None, Some(p)) => Some((m.id, p)),
            _ => None,
        })
        .collect();
    for (match_id, player) in walkovers {
        let m = db.bracket_match_mut(match_id)?;
        m.winner = Some(player);
        let next = m.next;
        if let Some(next) = next {
            advance_winner(db, tournament_id, next, Some(player))?;
        }
    }
    Ok(())
}

/// Put `player` (or nobody) into `slot` and cascade.
///
/// If the occupant changes, any result already recorded there is cleared and its old winner is
/// withdrawn from later rounds. A player whose opposite side can never be filled advances at once.
pub(crate) fn advance_winner(
    db: &mut Database,
    tournament_id: TournamentId,
    slot: NextSlot,
    player: Option<PlayerId>,
) -> Result<()> {
    let dead = dead_matches(&db.bracket_of(tournament_id));
    let mut slot = slot;
    let mut player = player;
    loop {
        let m = db.bracket_match_mut(slot.match_id)?;
        if m.player(slot.side) == player {
            return Ok(());
        }
        m.set_player(slot.side, player);
        let previous = m.winner;
        m.clear_result();
        if side_is_dead(&dead, m, other(slot.side)) {
            m.winner = player;
        }
        match m.next {
            Some(next) if m.winner != previous => {
                player = m.winner;
                slot = next;
            }
            _ => return Ok(()),
        }
    }
}

/// The tournament's bracket grouped by round.
pub fn bracket_rounds(db: &Database, tournament_id: TournamentId) -> Vec<BracketRound> {
    let mut rounds: Vec<BracketRound> = Vec::new();
    for m in db.bracket_of(tournament_id) {
        if rounds.last().map(|r| r.round_no) == Some(m.round_no) {
            let last = rounds.len() - 1;
            rounds[last].matches.push(m.clone());
        } else {
            rounds.push(BracketRound {
                round_no: m.round_no,
                matches: vec![m.clone()],
            });
        }
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_sizes() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2), 2);
        assert_eq!(next_power_of_two(5), 8);
        assert_eq!(next_power_of_two(16), 16);
        assert_eq!(next_power_of_two(33), 64);
        assert_eq!(round_count(5), 3);
        assert_eq!(round_count(64), 6);
    }

    #[test]
    fn standard_seed_layout() {
        assert_eq!(seed_positions(2), vec![1, 2]);
        assert_eq!(seed_positions(4), vec![1, 4, 2, 3]);
        assert_eq!(seed_positions(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    }
}
