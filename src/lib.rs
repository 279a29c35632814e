//! Tennis tournament organizer: models, tournament lifecycle logic, storage and REST API.

pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use error::{Result, TournamentError};
pub use logic::{
    build_bracket, compute_standings, finish_tournament, generate_groups, promote_to_knockout,
    record_bracket_score, record_group_score, register_player, select_qualifiers,
    withdraw_player, Seeding, StandingsRow, TournamentFilter,
};
pub use models::{
    BracketMatch, BracketMatchId, Caller, Format, Group, GroupId, GroupMatch, GroupMatchId, Level,
    Player, PlayerId, Side, Stage, Tournament, TournamentDraft, TournamentId, UserId,
};
pub use service::{GroupView, TournamentDetail, TournamentService};
pub use store::{read_players_csv, Database, Store};
