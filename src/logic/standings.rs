//! Group table: wins, losses, points for/against, ranking.

use crate::error::Result;
use crate::models::{GroupId, GroupMatch, PlayerId};
use crate::store::Database;
use serde::Serialize;

pub const POINTS_PER_WIN: u32 = 2;
pub const POINTS_PER_TIE: u32 = 1;

/// One line of a group table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StandingsRow {
    pub player: PlayerId,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: u64,
    pub points_against: u64,
    /// `points_for - points_against`.
    pub diff: i64,
    /// 2 per win, 1 per tie.
    pub points: u32,
}

impl StandingsRow {
    fn new(player: PlayerId) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    fn add(&mut self, scored: u32, conceded: u32) {
        self.points_for += u64::from(scored);
        self.points_against += u64::from(conceded);
        // Sums of u32 scores stay far below i64::MAX.
        self.diff = self.points_for as i64 - self.points_against as i64;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                self.points += POINTS_PER_WIN;
            }
            std::cmp::Ordering::Less => self.losses += 1,
            std::cmp::Ordering::Equal => {
                self.ties += 1;
                self.points += POINTS_PER_TIE;
            }
        }
    }
}

/// Table for a set of matches.
///
/// Every player referenced by a match gets a row (first appearance order), even with nothing
/// played yet. Only matches with both scores count. Sorted by points, then diff, then points
/// for, all descending; remaining ties keep their order.
pub fn compute_standings<'a>(matches: impl IntoIterator<Item = &'a GroupMatch>) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = Vec::new();
    let index_of = |rows: &mut Vec<StandingsRow>, player: PlayerId| -> usize {
        match rows.iter().position(|r| r.player == player) {
            Some(i) => i,
            None => {
                rows.push(StandingsRow::new(player));
                rows.len() - 1
            }
        }
    };

    for m in matches {
        let i1 = index_of(&mut rows, m.p1);
        let i2 = index_of(&mut rows, m.p2);
        if let (Some(s1), Some(s2)) = (m.p1_score, m.p2_score) {
            rows[i1].add(s1, s2);
            rows[i2].add(s2, s1);
        }
    }

    rows.sort_by(|a, b| {
        (b.points, b.diff, b.points_for).cmp(&(a.points, a.diff, a.points_for))
    });
    rows
}

/// Table for one stored group.
pub fn group_standings(db: &Database, group_id: GroupId) -> Result<Vec<StandingsRow>> {
    db.group(group_id)?;
    Ok(compute_standings(db.group_matches_of(group_id)))
}
