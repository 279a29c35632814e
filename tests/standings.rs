//! Integration tests for group tables and group scoring.

mod common;

use common::{rng, Fixture};
use tennis_tournaments::logic::{group_standings, parse_score, MAX_SCORE};
use tennis_tournaments::{
    compute_standings, generate_groups, record_group_score, Format, GroupMatch, Stage,
    StandingsRow, TournamentError,
};
use uuid::Uuid;

fn played(p1: Uuid, p2: Uuid, s1: u32, s2: u32) -> GroupMatch {
    let mut m = GroupMatch::new(Uuid::nil(), p1, p2);
    m.p1_score = Some(s1);
    m.p2_score = Some(s2);
    m
}

fn row(table: &[StandingsRow], player: Uuid) -> &StandingsRow {
    table.iter().find(|r| r.player == player).unwrap()
}

#[test]
fn three_player_table() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let matches = [played(a, b, 6, 3), played(b, c, 6, 2)];
    let table = compute_standings(&matches);

    let order: Vec<Uuid> = table.iter().map(|r| r.player).collect();
    assert_eq!(order, [a, b, c]);

    let ra = row(&table, a);
    assert_eq!((ra.wins, ra.losses, ra.points_for, ra.points_against), (1, 0, 6, 3));
    assert_eq!((ra.diff, ra.points), (3, 2));

    let rb = row(&table, b);
    assert_eq!((rb.wins, rb.losses, rb.points_for, rb.points_against), (1, 1, 9, 9));
    assert_eq!((rb.diff, rb.points), (0, 2));

    let rc = row(&table, c);
    assert_eq!((rc.wins, rc.losses, rc.points_for, rc.points_against), (0, 1, 2, 6));
    assert_eq!((rc.diff, rc.points), (-4, 0));
}

#[test]
fn points_for_breaks_equal_diff() {
    let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    // a and c both win by 2, c scored more.
    let matches = [played(a, b, 4, 2), played(c, d, 7, 5)];
    let table = compute_standings(&matches);
    let order: Vec<Uuid> = table.iter().map(|r| r.player).collect();
    assert_eq!(order, [c, a, d, b]);
}

#[test]
fn unplayed_matches_still_list_every_player() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let mut half = GroupMatch::new(Uuid::nil(), a, c);
    half.p1_score = Some(6);
    let matches = [GroupMatch::new(Uuid::nil(), a, b), half];
    let table = compute_standings(&matches);
    assert_eq!(table.len(), 3);
    assert!(table.iter().all(|r| r.points == 0 && r.points_for == 0));
}

#[test]
fn tie_gives_one_point_each_and_no_winner() {
    let mut f = Fixture::new(Format::Sixteen, 2);
    let groups = generate_groups(&mut f.db, f.tournament, 4, &mut rng(30)).unwrap();
    let only = f.db.group_matches_of(groups[0])[0].id;

    let m = record_group_score(&mut f.db, only, Some(5), Some(5)).unwrap();
    assert_eq!(m.winner, None);
    assert!(m.is_tie());

    let table = group_standings(&f.db, groups[0]).unwrap();
    for r in &table {
        assert_eq!((r.wins, r.losses, r.ties, r.points), (0, 0, 1, 1));
    }
}

#[test]
fn rescoring_and_clearing_group_match() {
    let mut f = Fixture::new(Format::Sixteen, 2);
    let groups = generate_groups(&mut f.db, f.tournament, 4, &mut rng(31)).unwrap();
    let m = f.db.group_matches_of(groups[0])[0].clone();

    let scored = record_group_score(&mut f.db, m.id, Some(6), Some(1)).unwrap();
    assert_eq!(scored.winner, Some(m.p1));
    let scored = record_group_score(&mut f.db, m.id, Some(2), Some(6)).unwrap();
    assert_eq!(scored.winner, Some(m.p2));

    let cleared = record_group_score(&mut f.db, m.id, parse_score("").unwrap(), None).unwrap();
    assert_eq!((cleared.p1_score, cleared.p2_score, cleared.winner), (None, None, None));
    let table = group_standings(&f.db, groups[0]).unwrap();
    assert!(table.iter().all(|r| r.points == 0));
}

#[test]
fn group_scores_only_during_group_stage() {
    let mut f = Fixture::new(Format::Sixteen, 4);
    let groups = generate_groups(&mut f.db, f.tournament, 4, &mut rng(32)).unwrap();
    let m = f.db.group_matches_of(groups[0])[0].id;
    f.db.tournament_mut(f.tournament).unwrap().stage = Stage::Knockout;
    assert_eq!(
        record_group_score(&mut f.db, m, Some(6), Some(0)),
        Err(TournamentError::InvalidStage { stage: Stage::Knockout })
    );
}

#[test]
fn unknown_group_is_not_found() {
    let f = Fixture::new(Format::Sixteen, 0);
    assert!(matches!(
        group_standings(&f.db, Uuid::new_v4()),
        Err(TournamentError::NotFound(_))
    ));
}

#[test]
fn huge_scores_do_not_overflow_the_table() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let matches = [
        played(a, b, u32::MAX, 0),
        played(a, c, u32::MAX, 0),
        played(b, c, u32::MAX, 0),
    ];
    let table = compute_standings(&matches);
    let ra = row(&table, a);
    assert_eq!(ra.points_for, 2 * u64::from(u32::MAX));
    assert_eq!(ra.diff, 2 * i64::from(u32::MAX));
    assert_eq!(row(&table, c).diff, -2 * i64::from(u32::MAX));
    let order: Vec<Uuid> = table.iter().map(|r| r.player).collect();
    assert_eq!(order, [a, b, c]);
}

#[test]
fn out_of_range_group_scores_are_rejected() {
    let mut f = Fixture::new(Format::Sixteen, 3);
    let groups = generate_groups(&mut f.db, f.tournament, 4, &mut rng(33)).unwrap();
    let m = f.db.group_matches_of(groups[0])[0].id;

    for (s1, s2) in [(MAX_SCORE + 1, 0), (0, u32::MAX)] {
        assert!(matches!(
            record_group_score(&mut f.db, m, Some(s1), Some(s2)),
            Err(TournamentError::Validation(_))
        ));
    }
    let stored = f.db.group_match(m).unwrap();
    assert_eq!((stored.p1_score, stored.p2_score), (None, None));

    record_group_score(&mut f.db, m, Some(MAX_SCORE), Some(0)).unwrap();
    group_standings(&f.db, groups[0]).unwrap();
}
