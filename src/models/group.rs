//! Round-robin groups and their matches.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GroupId = Uuid;
pub type GroupMatchId = Uuid;

/// A group inside one tournament, labeled A, B, C, ...
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub tournament_id: TournamentId,
    /// Unique within the tournament.
    pub code: String,
    /// Players assigned to this group, in assignment order.
    pub players: Vec<PlayerId>,
}

impl Group {
    pub fn new(tournament_id: TournamentId, index: usize, players: Vec<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            code: group_code(index),
            players,
        }
    }
}

/// Label for the `index`-th group: A..Z, then AA, AB, ...
pub fn group_code(index: usize) -> String {
    let mut n = index + 1;
    let mut code = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        code.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    code.reverse();
    String::from_utf8_lossy(&code).into_owned()
}

/// One round-robin pairing. Scores are `None` until entered.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupMatch {
    pub id: GroupMatchId,
    pub group_id: GroupId,
    pub p1: PlayerId,
    pub p2: PlayerId,
    pub p1_score: Option<u32>,
    pub p2_score: Option<u32>,
    /// Unset until both scores are present; stays unset on a tie.
    pub winner: Option<PlayerId>,
}

impl GroupMatch {
    pub fn new(group_id: GroupId, p1: PlayerId, p2: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            p1,
            p2,
            p1_score: None,
            p2_score: None,
            winner: None,
        }
    }

    /// Both scores entered and equal.
    pub fn is_tie(&self) -> bool {
        matches!((self.p1_score, self.p2_score), (Some(a), Some(b)) if a == b)
    }
}
