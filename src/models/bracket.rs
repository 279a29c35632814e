//! Single-elimination bracket nodes addressed by (round, slot).

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BracketMatchId = Uuid;

/// Which side of a match a player occupies.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    P1,
    P2,
}

/// Where the winner of a match goes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NextSlot {
    pub match_id: BracketMatchId,
    pub side: Side,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: BracketMatchId,
    pub tournament_id: TournamentId,
    /// 1 is the first round; the final is round log2(size).
    pub round_no: u32,
    /// 1-based, left to right within the round.
    pub slot: u32,
    /// `None` is a bye or a slot not yet filled by an earlier round.
    pub p1: Option<PlayerId>,
    pub p2: Option<PlayerId>,
    pub p1_score: Option<u32>,
    pub p2_score: Option<u32>,
    pub winner: Option<PlayerId>,
    /// `None` only for the final.
    pub next: Option<NextSlot>,
}

impl BracketMatch {
    pub fn new(
        tournament_id: TournamentId,
        round_no: u32,
        slot: u32,
        p1: Option<PlayerId>,
        p2: Option<PlayerId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round_no,
            slot,
            p1,
            p2,
            p1_score: None,
            p2_score: None,
            winner: None,
            next: None,
        }
    }

    pub fn player(&self, side: Side) -> Option<PlayerId> {
        match side {
            Side::P1 => self.p1,
            Side::P2 => self.p2,
        }
    }

    pub fn set_player(&mut self, side: Side, player: Option<PlayerId>) {
        match side {
            Side::P1 => self.p1 = player,
            Side::P2 => self.p2 = player,
        }
    }

    pub fn has_both_players(&self) -> bool {
        self.p1.is_some() && self.p2.is_some()
    }

    pub fn clear_result(&mut self) {
        self.p1_score = None;
        self.p2_score = None;
        self.winner = None;
    }
}

/// Side of the next-round match fed by `slot` (odd slots feed p1).
pub fn feeding_side(slot: u32) -> Side {
    if slot % 2 == 1 {
        Side::P1
    } else {
        Side::P2
    }
}
