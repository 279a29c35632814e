//! In-memory relational store. Writes go through `Store::transaction`, which
//! works on a copy of every table and commits it only when the closure succeeds.

use crate::error::{Result, TournamentError};
use crate::models::{
    BracketMatch, BracketMatchId, Group, GroupId, GroupMatch, GroupMatchId, Level, Player,
    PlayerId, Tournament, TournamentId, UserId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::sync::RwLock;
use uuid::Uuid;

/// All tables. Groups and matches are kept in creation order.
#[derive(Clone, Debug, Default)]
pub struct Database {
    players: HashMap<PlayerId, Player>,
    tournaments: HashMap<TournamentId, Tournament>,
    groups: Vec<Group>,
    group_matches: Vec<GroupMatch>,
    bracket_matches: Vec<BracketMatch>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- players (directory, read-mostly)

    pub fn insert_player(&mut self, player: Player) -> PlayerId {
        let id = player.id;
        self.players.insert(id, player);
        id
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .get(&id)
            .ok_or(TournamentError::NotFound("Player"))
    }

    /// The profile owned by an account, if it has one.
    pub fn player_for_user(&self, user_id: UserId) -> Option<&Player> {
        self.players.values().find(|p| p.user_id == Some(user_id))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    // ---- tournaments

    pub fn insert_tournament(&mut self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        self.tournaments.insert(id, tournament);
        id
    }

    pub fn tournament(&self, id: TournamentId) -> Result<&Tournament> {
        self.tournaments
            .get(&id)
            .ok_or(TournamentError::NotFound("Tournament"))
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> Result<&mut Tournament> {
        self.tournaments
            .get_mut(&id)
            .ok_or(TournamentError::NotFound("Tournament"))
    }

    pub fn tournaments(&self) -> impl Iterator<Item = &Tournament> {
        self.tournaments.values()
    }

    /// Delete a tournament with its groups, group matches and bracket.
    pub fn remove_tournament(&mut self, id: TournamentId) -> Result<Tournament> {
        let tournament = self
            .tournaments
            .remove(&id)
            .ok_or(TournamentError::NotFound("Tournament"))?;
        self.delete_groups(id);
        self.delete_bracket(id);
        Ok(tournament)
    }

    // ---- groups

    pub fn insert_group(&mut self, group: Group) -> GroupId {
        let id = group.id;
        self.groups.push(group);
        id
    }

    pub fn group(&self, id: GroupId) -> Result<&Group> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or(TournamentError::NotFound("Group"))
    }

    /// Groups of a tournament ordered by code (A..Z, AA, ...).
    pub fn groups_of(&self, tournament_id: TournamentId) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.tournament_id == tournament_id)
            .collect();
        groups.sort_by(|a, b| (a.code.len(), &a.code).cmp(&(b.code.len(), &b.code)));
        groups
    }

    /// Delete every group of the tournament and their matches. Returns the number of groups removed.
    pub fn delete_groups(&mut self, tournament_id: TournamentId) -> usize {
        let doomed: Vec<GroupId> = self
            .groups
            .iter()
            .filter(|g| g.tournament_id == tournament_id)
            .map(|g| g.id)
            .collect();
        self.group_matches.retain(|m| !doomed.contains(&m.group_id));
        self.groups.retain(|g| g.tournament_id != tournament_id);
        doomed.len()
    }

    // ---- group matches

    pub fn insert_group_match(&mut self, m: GroupMatch) -> GroupMatchId {
        let id = m.id;
        self.group_matches.push(m);
        id
    }

    pub fn group_match(&self, id: GroupMatchId) -> Result<&GroupMatch> {
        self.group_matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(TournamentError::NotFound("Group match"))
    }

    pub fn group_match_mut(&mut self, id: GroupMatchId) -> Result<&mut GroupMatch> {
        self.group_matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TournamentError::NotFound("Group match"))
    }

    /// Matches of one group in creation order.
    pub fn group_matches_of(&self, group_id: GroupId) -> Vec<&GroupMatch> {
        self.group_matches
            .iter()
            .filter(|m| m.group_id == group_id)
            .collect()
    }

    pub fn group_match_count(&self) -> usize {
        self.group_matches.len()
    }

    // ---- bracket

    pub fn insert_bracket_match(&mut self, m: BracketMatch) -> BracketMatchId {
        let id = m.id;
        self.bracket_matches.push(m);
        id
    }

    pub fn bracket_match(&self, id: BracketMatchId) -> Result<&BracketMatch> {
        self.bracket_matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(TournamentError::NotFound("Bracket match"))
    }

    pub fn bracket_match_mut(&mut self, id: BracketMatchId) -> Result<&mut BracketMatch> {
        self.bracket_matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TournamentError::NotFound("Bracket match"))
    }

    /// Bracket of a tournament ordered by (round, slot).
    pub fn bracket_of(&self, tournament_id: TournamentId) -> Vec<&BracketMatch> {
        let mut matches: Vec<&BracketMatch> = self
            .bracket_matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .collect();
        matches.sort_by_key(|m| (m.round_no, m.slot));
        matches
    }

    /// Delete the tournament's bracket. Returns the number of matches removed.
    pub fn delete_bracket(&mut self, tournament_id: TournamentId) -> usize {
        let before = self.bracket_matches.len();
        self.bracket_matches
            .retain(|m| m.tournament_id != tournament_id);
        before - self.bracket_matches.len()
    }
}

/// Shared handle to the database.
#[derive(Debug, Default)]
pub struct Store {
    db: RwLock<Database>,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self {
            db: RwLock::new(db),
        }
    }

    /// Run a query against a consistent snapshot.
    pub fn read<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let guard = self
            .db
            .read()
            .map_err(|_| TournamentError::Storage("lock error".into()))?;
        f(&guard)
    }

    /// All-or-nothing write: the closure's changes are committed only if it returns `Ok`.
    /// Holding the write lock for the whole closure serialises concurrent writers.
    pub fn transaction<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut guard = self
            .db
            .write()
            .map_err(|_| TournamentError::Storage("lock error".into()))?;
        let mut working = guard.clone();
        let out = f(&mut working)?;
        *guard = working;
        Ok(out)
    }
}

/// One row of the player directory seed file.
#[derive(Debug, Deserialize)]
struct PlayerRecord {
    id: Option<Uuid>,
    user_id: Option<Uuid>,
    first_name: String,
    last_name: String,
    level: Option<String>,
}

/// Parse a player directory CSV (`id,user_id,first_name,last_name,level`).
/// Empty `id` gets a fresh one; empty `user_id`/`level` mean none.
pub fn read_players_csv<R: io::Read>(reader: R) -> Result<Vec<Player>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut players = Vec::new();
    for (line, record) in rdr.deserialize::<PlayerRecord>().enumerate() {
        let record = record
            .map_err(|e| TournamentError::Validation(format!("players csv row {}: {e}", line + 1)))?;
        let level = match record.level.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Level>()?),
        };
        players.push(Player {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            user_id: record.user_id,
            first_name: record.first_name,
            last_name: record.last_name,
            level,
        });
    }
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_transaction_leaves_tables_untouched() {
        let store = Store::default();
        let p = Player::new("Ana", "Ivanova", None);
        let id = p.id;
        let res: Result<()> = store.transaction(|db| {
            db.insert_player(p);
            Err(TournamentError::Validation("boom".into()))
        });
        assert!(res.is_err());
        let missing = store.read(|db| Ok(db.player(id).is_err())).unwrap();
        assert!(missing);
    }

    #[test]
    fn csv_rows_become_players() {
        let data = "\
id,user_id,first_name,last_name,level
,,Ana,Ivanova,\"4,5\"
,8c2f4f37-5c1a-4a8e-9d55-0d1f6f3c9a11,Boris,Petrov,
";
        let players = read_players_csv(data.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].level.map(|l| l.to_string()), Some("4.5".into()));
        assert!(players[0].user_id.is_none());
        assert!(players[1].user_id.is_some());
        assert!(players[1].level.is_none());
    }

    #[test]
    fn csv_rejects_bad_level() {
        let data = "id,user_id,first_name,last_name,level\n,,Ana,Ivanova,expert\n";
        assert!(matches!(
            read_players_csv(data.as_bytes()),
            Err(TournamentError::Validation(_))
        ));
    }
}
