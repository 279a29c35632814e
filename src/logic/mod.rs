//! Tournament business logic: registration, groups, bracket, scoring, standings, promotion.

mod bracket;
mod group_stage;
mod lifecycle;
mod listing;
mod promotion;
mod registration;
mod scoring;
mod standings;

pub use bracket::{
    bracket_rounds, build_bracket, next_power_of_two, round_count, seed_positions, BracketRound,
    Seeding,
};
pub use group_stage::{
    clamp_group_size, generate_groups, round_robin_pairs, DEFAULT_GROUP_SIZE, MAX_GROUP_SIZE,
    MIN_GROUP_SIZE,
};
pub use lifecycle::{ensure_allowed, finish_tournament, transition, Action};
pub use listing::{list_tournaments, TournamentFilter};
pub use promotion::{promote_to_knockout, select_qualifiers, DEFAULT_TAKE};
pub use registration::{
    ensure_can_change_roster, own_player, register_player, withdraw_player, RosterChange,
};
pub use scoring::{
    decide_winner, parse_score, record_bracket_score, record_group_score,
    tournament_of_bracket_match, tournament_of_group_match, MAX_SCORE,
};
pub use standings::{compute_standings, group_standings, StandingsRow, POINTS_PER_TIE, POINTS_PER_WIN};
