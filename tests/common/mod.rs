//! Shared fixtures for integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tennis_tournaments::{
    register_player, record_bracket_score, Database, Format, Level, Player, PlayerId,
    TournamentDraft, Tournament, TournamentId, UserId,
};
use uuid::Uuid;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn level(raw: &str) -> Level {
    raw.parse().unwrap()
}

pub fn draft(format: Format) -> TournamentDraft {
    TournamentDraft {
        name: "Almaty Open".into(),
        location: "Almaty, Central Courts".into(),
        date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        time: None,
        format,
        description: None,
        min_level: None,
        max_level: None,
    }
}

/// A database with one tournament (created by `organizer`) and `n` registered players.
pub struct Fixture {
    pub db: Database,
    pub organizer: UserId,
    pub tournament: TournamentId,
    pub players: Vec<PlayerId>,
}

impl Fixture {
    pub fn new(format: Format, registered: usize) -> Self {
        let mut db = Database::new();
        let organizer = Uuid::new_v4();
        let tournament = db.insert_tournament(Tournament::new(draft(format), organizer).unwrap());
        let mut players = Vec::new();
        for i in 0..registered {
            let id = db.insert_player(Player::new(format!("Player{i}"), "Test", Some(level("3.5"))));
            register_player(&mut db, tournament, id).unwrap();
            players.push(id);
        }
        Self {
            db,
            organizer,
            tournament,
            players,
        }
    }

    pub fn tournament(&self) -> &Tournament {
        self.db.tournament(self.tournament).unwrap()
    }
}

/// Score every playable bracket match (p1 wins 6-3) until nothing is left to play.
pub fn play_out_bracket(db: &mut Database, tournament: TournamentId) {
    loop {
        let pending = db
            .bracket_of(tournament)
            .into_iter()
            .find(|m| m.has_both_players() && m.winner.is_none())
            .map(|m| m.id);
        match pending {
            Some(id) => {
                record_bracket_score(db, id, Some(6), Some(3)).unwrap();
            }
            None => break,
        }
    }
}
