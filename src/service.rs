//! Organizer-facing actions: authorization, one transaction per action, logging.

use crate::error::{Result, TournamentError};
use crate::logic::{
    self, bracket_rounds, clamp_group_size, group_standings, BracketRound, RosterChange,
    Seeding, StandingsRow, TournamentFilter, DEFAULT_TAKE,
};
use crate::models::{
    BracketMatch, BracketMatchId, Caller, Group, GroupId, GroupMatch, GroupMatchId, Player,
    PlayerId, Tournament, TournamentDraft, TournamentId,
};
use crate::store::{Database, Store};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Mutex;
use uuid::Uuid;

/// A group with its matches and current table.
#[derive(Clone, Debug, Serialize)]
pub struct GroupView {
    pub group: Group,
    pub matches: Vec<GroupMatch>,
    pub standings: Vec<StandingsRow>,
}

/// Everything shown on a tournament page.
#[derive(Clone, Debug, Serialize)]
pub struct TournamentDetail {
    pub tournament: Tournament,
    pub level_range: String,
    pub participants: Vec<Player>,
    pub groups: Vec<GroupView>,
    pub rounds: Vec<BracketRound>,
}

pub struct TournamentService {
    store: Store,
    rng: Mutex<StdRng>,
}

fn log_rejection<T>(action: &str, target: Uuid, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        log::warn!("{action} rejected for {target}: {e}");
    }
    result
}

fn group_view(db: &Database, group_id: GroupId) -> Result<GroupView> {
    Ok(GroupView {
        group: db.group(group_id)?.clone(),
        matches: db.group_matches_of(group_id).into_iter().cloned().collect(),
        standings: group_standings(db, group_id)?,
    })
}

impl TournamentService {
    /// `shuffle_seed` makes every shuffle reproducible; `None` seeds from entropy.
    pub fn new(store: Store, shuffle_seed: Option<u64>) -> Self {
        let rng = match shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Write transaction with access to the shared random source.
    fn transaction_with_rng<T>(
        &self,
        f: impl FnOnce(&mut Database, &mut StdRng) -> Result<T>,
    ) -> Result<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| TournamentError::Storage("rng lock error".into()))?;
        self.store.transaction(|db| f(db, &mut *rng))
    }

    // ---- tournaments

    pub fn create_tournament(&self, caller: &Caller, draft: TournamentDraft) -> Result<Tournament> {
        let creator = caller.user_id.ok_or(TournamentError::Unauthorized)?;
        let tournament = Tournament::new(draft, creator)?;
        let created = tournament.clone();
        self.store.transaction(|db| Ok(db.insert_tournament(tournament)))?;
        log::info!("Created tournament {} ({})", created.id, created.name);
        Ok(created)
    }

    pub fn update_tournament(
        &self,
        caller: &Caller,
        id: TournamentId,
        draft: TournamentDraft,
    ) -> Result<Tournament> {
        let result = self.store.transaction(|db| {
            let t = db.tournament_mut(id)?;
            t.ensure_can_manage(caller)?;
            t.apply(draft)?;
            Ok(t.clone())
        });
        let t = log_rejection("update", id, result)?;
        log::info!("Updated tournament {id}");
        Ok(t)
    }

    pub fn delete_tournament(&self, caller: &Caller, id: TournamentId) -> Result<()> {
        let result = self.store.transaction(|db| {
            db.tournament(id)?.ensure_can_manage(caller)?;
            db.remove_tournament(id).map(|_| ())
        });
        log_rejection("delete", id, result)?;
        log::info!("Deleted tournament {id}");
        Ok(())
    }

    pub fn tournament(&self, id: TournamentId) -> Result<TournamentDetail> {
        self.store.read(|db| {
            let tournament = db.tournament(id)?.clone();
            let mut participants = tournament
                .players
                .iter()
                .map(|&pid| db.player(pid).cloned())
                .collect::<Result<Vec<_>>>()?;
            participants.sort_by(|a, b| {
                (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
            });
            let groups = db
                .groups_of(id)
                .into_iter()
                .map(|g| group_view(db, g.id))
                .collect::<Result<Vec<_>>>()?;
            Ok(TournamentDetail {
                level_range: tournament.level_range_display(),
                rounds: bracket_rounds(db, id),
                tournament,
                participants,
                groups,
            })
        })
    }

    pub fn list_tournaments(&self, filter: &TournamentFilter) -> Result<Vec<Tournament>> {
        self.store.read(|db| Ok(logic::list_tournaments(db, filter)))
    }

    // ---- roster

    /// Register the caller's own player profile.
    pub fn join(&self, caller: &Caller, id: TournamentId) -> Result<RosterChange> {
        let result = self.store.transaction(|db| {
            let player_id = logic::own_player(db, caller)?;
            logic::register_player(db, id, player_id)
        });
        let change = log_rejection("join", id, result)?;
        log::info!("Join on tournament {id}: {change:?}");
        Ok(change)
    }

    /// Withdraw the caller's own player profile.
    pub fn leave(&self, caller: &Caller, id: TournamentId) -> Result<RosterChange> {
        let result = self.store.transaction(|db| {
            let player_id = logic::own_player(db, caller)?;
            logic::withdraw_player(db, id, player_id)
        });
        let change = log_rejection("leave", id, result)?;
        log::info!("Leave on tournament {id}: {change:?}");
        Ok(change)
    }

    /// Register any player (their owner or the organizer).
    pub fn register_player(
        &self,
        caller: &Caller,
        id: TournamentId,
        player_id: PlayerId,
    ) -> Result<RosterChange> {
        let result = self.store.transaction(|db| {
            logic::ensure_can_change_roster(db, caller, id, player_id)?;
            logic::register_player(db, id, player_id)
        });
        let change = log_rejection("register", id, result)?;
        log::info!("Registered player {player_id} in tournament {id}: {change:?}");
        Ok(change)
    }

    pub fn withdraw_player(
        &self,
        caller: &Caller,
        id: TournamentId,
        player_id: PlayerId,
    ) -> Result<RosterChange> {
        let result = self.store.transaction(|db| {
            logic::ensure_can_change_roster(db, caller, id, player_id)?;
            logic::withdraw_player(db, id, player_id)
        });
        let change = log_rejection("withdraw", id, result)?;
        log::info!("Withdrew player {player_id} from tournament {id}: {change:?}");
        Ok(change)
    }

    // ---- stages

    /// (Re)generate groups. `group_size` defaults to 4 and is clamped to [2, 8].
    pub fn generate_groups(
        &self,
        caller: &Caller,
        id: TournamentId,
        group_size: Option<usize>,
    ) -> Result<Vec<GroupId>> {
        let size = clamp_group_size(group_size);
        let result = self.transaction_with_rng(|db, rng| {
            db.tournament(id)?.ensure_can_manage(caller)?;
            logic::generate_groups(db, id, size, rng)
        });
        let groups = log_rejection("generate groups", id, result)?;
        log::info!(
            "Generated {} group(s) of up to {size} for tournament {id}",
            groups.len()
        );
        Ok(groups)
    }

    /// (Re)generate the bracket from all registered players in random order.
    pub fn generate_knockout(&self, caller: &Caller, id: TournamentId) -> Result<Vec<BracketMatchId>> {
        let result = self.transaction_with_rng(|db, rng| {
            db.tournament(id)?.ensure_can_manage(caller)?;
            logic::build_bracket(db, id, Seeding::Shuffled, rng)
        });
        let matches = log_rejection("generate knockout", id, result)?;
        log::info!(
            "Generated knockout bracket with {} match(es) for tournament {id}",
            matches.len()
        );
        Ok(matches)
    }

    /// Seed the bracket with the top `take` (default 2) of every group.
    pub fn promote(
        &self,
        caller: &Caller,
        id: TournamentId,
        take: Option<usize>,
    ) -> Result<Vec<BracketMatchId>> {
        let take = take.unwrap_or(DEFAULT_TAKE);
        let result = self.transaction_with_rng(|db, rng| {
            db.tournament(id)?.ensure_can_manage(caller)?;
            logic::promote_to_knockout(db, id, take, rng)
        });
        let matches = log_rejection("promote", id, result)?;
        log::info!("Promoted top {take} per group into the bracket of tournament {id}");
        Ok(matches)
    }

    pub fn finish(&self, caller: &Caller, id: TournamentId) -> Result<()> {
        let result = self.store.transaction(|db| {
            db.tournament(id)?.ensure_can_manage(caller)?;
            logic::finish_tournament(db, id)
        });
        log_rejection("finish", id, result)?;
        log::info!("Tournament {id} finished");
        Ok(())
    }

    // ---- results

    pub fn group(&self, group_id: GroupId) -> Result<GroupView> {
        self.store.read(|db| group_view(db, group_id))
    }

    pub fn record_group_score(
        &self,
        caller: &Caller,
        match_id: GroupMatchId,
        p1_score: Option<u32>,
        p2_score: Option<u32>,
    ) -> Result<GroupMatch> {
        let result = self.store.transaction(|db| {
            let tournament_id = logic::tournament_of_group_match(db, match_id)?;
            db.tournament(tournament_id)?.ensure_can_manage(caller)?;
            logic::record_group_score(db, match_id, p1_score, p2_score)
        });
        let m = log_rejection("group score", match_id, result)?;
        log::info!(
            "Group match {match_id} scored {:?}-{:?}",
            m.p1_score,
            m.p2_score
        );
        Ok(m)
    }

    pub fn record_bracket_score(
        &self,
        caller: &Caller,
        match_id: BracketMatchId,
        p1_score: Option<u32>,
        p2_score: Option<u32>,
    ) -> Result<BracketMatch> {
        let result = self.store.transaction(|db| {
            let tournament_id = logic::tournament_of_bracket_match(db, match_id)?;
            db.tournament(tournament_id)?.ensure_can_manage(caller)?;
            logic::record_bracket_score(db, match_id, p1_score, p2_score)
        });
        let m = log_rejection("bracket score", match_id, result)?;
        log::info!(
            "Bracket match R{} S{} scored {:?}-{:?}",
            m.round_no,
            m.slot,
            m.p1_score,
            m.p2_score
        );
        Ok(m)
    }
}
