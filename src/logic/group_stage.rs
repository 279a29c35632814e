//! Group stage: random partition into round-robin groups.

use crate::error::Result;
use crate::logic::lifecycle::{transition, Action};
use crate::models::{Group, GroupId, GroupMatch, PlayerId, TournamentId};
use crate::store::Database;
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_GROUP_SIZE: usize = 4;
pub const MIN_GROUP_SIZE: usize = 2;
pub const MAX_GROUP_SIZE: usize = 8;

/// Requested group size clamped to [2, 8]; `None` means the default of 4.
pub fn clamp_group_size(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_GROUP_SIZE)
        .clamp(MIN_GROUP_SIZE, MAX_GROUP_SIZE)
}

/// Every unordered pair of `players`, in order (i < j).
pub fn round_robin_pairs(players: &[PlayerId]) -> Vec<(PlayerId, PlayerId)> {
    let mut pairs = Vec::with_capacity(players.len() * players.len().saturating_sub(1) / 2);
    for (i, &p1) in players.iter().enumerate() {
        for &p2 in &players[i + 1..] {
            pairs.push((p1, p2));
        }
    }
    pairs
}

/// (Re)generate the group stage.
///
/// 1. Delete existing groups and their matches.
/// 2. Shuffle registered players and cut them into chunks of `group_size` (last may be smaller).
/// 3. Label chunks A, B, C, ... and create one match per pair inside each.
/// 4. Move the tournament to Groups, even when fewer than 2 players produced no groups.
pub fn generate_groups<R: Rng + ?Sized>(
    db: &mut Database,
    tournament_id: TournamentId,
    group_size: usize,
    rng: &mut R,
) -> Result<Vec<GroupId>> {
    let tournament = db.tournament(tournament_id)?;
    let next = transition(tournament.stage, Action::GenerateGroups)?;
    let mut players: Vec<PlayerId> = tournament.players.iter().copied().collect();
    let group_size = group_size.clamp(MIN_GROUP_SIZE, MAX_GROUP_SIZE);

    db.delete_groups(tournament_id);

    let mut created = Vec::new();
    if players.len() >= 2 {
        players.shuffle(rng);
        for (index, chunk) in players.chunks(group_size).enumerate() {
            let group = Group::new(tournament_id, index, chunk.to_vec());
            let group_id = db.insert_group(group);
            for (p1, p2) in round_robin_pairs(chunk) {
                db.insert_group_match(GroupMatch::new(group_id, p1, p2));
            }
            created.push(group_id);
        }
    }

    db.tournament_mut(tournament_id)?.stage = next;
    Ok(created)
}
