//! Integration tests for the organizer-facing service: authorization, atomicity, listing.

mod common;

use chrono::NaiveDate;
use common::{draft, level, Fixture};
use tennis_tournaments::logic::RosterChange;
use tennis_tournaments::{
    Caller, Format, Player, Stage, Store, TournamentError, TournamentFilter, TournamentService,
};
use uuid::Uuid;

fn service(f: &Fixture, seed: u64) -> TournamentService {
    TournamentService::new(Store::new(f.db.clone()), Some(seed))
}

#[test]
fn only_the_creator_or_a_superuser_may_generate() {
    let f = Fixture::new(Format::Sixteen, 8);
    let svc = service(&f, 60);
    let stranger = Caller::user(Uuid::new_v4());

    assert_eq!(
        svc.generate_groups(&stranger, f.tournament, None),
        Err(TournamentError::Unauthorized)
    );
    assert_eq!(
        svc.generate_knockout(&Caller::anonymous(), f.tournament),
        Err(TournamentError::Unauthorized)
    );
    let detail = svc.tournament(f.tournament).unwrap();
    assert_eq!(detail.tournament.stage, Stage::Registration);
    assert!(detail.groups.is_empty() && detail.rounds.is_empty());

    let admin = Caller::superuser(Uuid::new_v4());
    assert_eq!(svc.generate_groups(&admin, f.tournament, Some(4)).unwrap().len(), 2);
    let owner = Caller::user(f.organizer);
    assert_eq!(svc.generate_knockout(&owner, f.tournament).unwrap().len(), 7);
}

#[test]
fn same_seed_same_draw() {
    let f = Fixture::new(Format::ThirtyTwo, 11);
    let owner = Caller::user(f.organizer);
    let draws: Vec<_> = (0..2)
        .map(|_| {
            let svc = service(&f, 61);
            svc.generate_knockout(&owner, f.tournament).unwrap();
            svc.tournament(f.tournament)
                .unwrap()
                .rounds
                .into_iter()
                .flat_map(|r| r.matches)
                .map(|m| (m.round_no, m.slot, m.p1, m.p2))
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(draws[0], draws[1]);
}

#[test]
fn group_size_is_clamped() {
    let f = Fixture::new(Format::Sixteen, 10);
    let svc = service(&f, 62);
    let owner = Caller::user(f.organizer);
    assert_eq!(svc.generate_groups(&owner, f.tournament, Some(1)).unwrap().len(), 5);
    assert_eq!(svc.generate_groups(&owner, f.tournament, Some(100)).unwrap().len(), 2);
    assert_eq!(svc.generate_groups(&owner, f.tournament, None).unwrap().len(), 3);
}

#[test]
fn join_uses_the_callers_profile() {
    let f = Fixture::new(Format::Sixteen, 0);
    let mut db = f.db.clone();
    let account = Uuid::new_v4();
    let profile = db.insert_player(Player::new("Dana", "Ivanova", Some(level("4.0"))).owned_by(account));
    let svc = TournamentService::new(Store::new(db), Some(63));
    let me = Caller::user(account);

    assert_eq!(svc.join(&me, f.tournament), Ok(RosterChange::Joined));
    assert_eq!(svc.join(&me, f.tournament), Ok(RosterChange::AlreadyRegistered));
    let detail = svc.tournament(f.tournament).unwrap();
    assert_eq!(detail.participants.len(), 1);
    assert_eq!(detail.participants[0].id, profile);
    assert_eq!(svc.leave(&me, f.tournament), Ok(RosterChange::Left));

    assert_eq!(
        svc.join(&Caller::anonymous(), f.tournament),
        Err(TournamentError::Unauthorized)
    );
    assert!(matches!(
        svc.join(&Caller::user(Uuid::new_v4()), f.tournament),
        Err(TournamentError::Validation(_))
    ));
}

#[test]
fn registering_someone_elses_player_needs_the_organizer() {
    let f = Fixture::new(Format::Sixteen, 0);
    let mut db = f.db.clone();
    let owner_account = Uuid::new_v4();
    let player = db.insert_player(Player::new("Ali", "Bek", None).owned_by(owner_account));
    let svc = TournamentService::new(Store::new(db), Some(64));

    assert_eq!(
        svc.register_player(&Caller::user(Uuid::new_v4()), f.tournament, player),
        Err(TournamentError::Unauthorized)
    );
    assert_eq!(
        svc.register_player(&Caller::user(f.organizer), f.tournament, player),
        Ok(RosterChange::Joined)
    );
    assert_eq!(
        svc.withdraw_player(&Caller::user(owner_account), f.tournament, player),
        Ok(RosterChange::Left)
    );
}

#[test]
fn failed_action_leaves_no_partial_state() {
    let f = Fixture::new(Format::Sixteen, 4);
    let svc = service(&f, 65);
    let owner = Caller::user(f.organizer);
    svc.generate_knockout(&owner, f.tournament).unwrap();
    let before = svc.tournament(f.tournament).unwrap();

    // Promotion is rejected in Knockout; the bracket stays as it was.
    assert!(svc.promote(&owner, f.tournament, None).is_err());
    let after = svc.tournament(f.tournament).unwrap();
    let ids = |d: &tennis_tournaments::TournamentDetail| {
        d.rounds
            .iter()
            .flat_map(|r| r.matches.iter().map(|m| m.id))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&before), ids(&after));
    assert_eq!(after.tournament.stage, Stage::Knockout);
}

#[test]
fn edit_and_delete() {
    let f = Fixture::new(Format::ThirtyTwo, 20);
    let svc = service(&f, 66);
    let owner = Caller::user(f.organizer);

    assert_eq!(
        svc.update_tournament(&owner, f.tournament, draft(Format::Sixteen)),
        Err(TournamentError::Capacity { format: 16 })
    );
    let mut renamed = draft(Format::SixtyFour);
    renamed.name = "  Astana Cup ".into();
    let updated = svc.update_tournament(&owner, f.tournament, renamed).unwrap();
    assert_eq!(updated.name, "Astana Cup");
    assert_eq!(updated.players.len(), 20);

    svc.generate_groups(&owner, f.tournament, None).unwrap();
    assert_eq!(
        svc.delete_tournament(&Caller::user(Uuid::new_v4()), f.tournament),
        Err(TournamentError::Unauthorized)
    );
    svc.delete_tournament(&owner, f.tournament).unwrap();
    assert_eq!(
        svc.tournament(f.tournament).map(|d| d.tournament.id),
        Err(TournamentError::NotFound("Tournament"))
    );
    let leftovers = svc.store().read(|db| Ok(db.group_match_count())).unwrap();
    assert_eq!(leftovers, 0);
}

#[test]
fn creating_requires_an_account_and_valid_fields() {
    let svc = TournamentService::new(Store::default(), Some(67));
    assert_eq!(
        svc.create_tournament(&Caller::anonymous(), draft(Format::Sixteen)),
        Err(TournamentError::Unauthorized)
    );
    let mut bad = draft(Format::Sixteen);
    bad.min_level = Some(level("5.0"));
    bad.max_level = Some(level("4.0"));
    assert!(matches!(
        svc.create_tournament(&Caller::user(Uuid::new_v4()), bad),
        Err(TournamentError::Validation(_))
    ));
    let mut blank = draft(Format::Sixteen);
    blank.location = "   ".into();
    assert!(svc.create_tournament(&Caller::user(Uuid::new_v4()), blank).is_err());
}

#[test]
fn listing_filters_and_orders() {
    let svc = TournamentService::new(Store::default(), Some(68));
    let me = Caller::user(Uuid::new_v4());
    let mk = |name: &str, location: &str, day: u32, format: Format, min: Option<&str>| {
        let mut d = draft(format);
        d.name = name.into();
        d.location = location.into();
        d.date = NaiveDate::from_ymd_opt(2026, 7, day).unwrap();
        d.min_level = min.map(level);
        svc.create_tournament(&me, d).unwrap()
    };
    mk("Summer Slam", "Almaty", 20, Format::Sixteen, None);
    mk("Steppe Open", "Astana", 5, Format::ThirtyTwo, Some("4.0"));
    mk("Night Cup", "almaty, Dostyk", 10, Format::SixtyFour, Some("3.0"));

    let names = |filter: TournamentFilter| -> Vec<String> {
        svc.list_tournaments(&filter)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect()
    };
    assert_eq!(
        names(TournamentFilter::default()),
        ["Steppe Open", "Night Cup", "Summer Slam"]
    );
    assert_eq!(
        names(TournamentFilter {
            city: Some("ALMATY".into()),
            ..Default::default()
        }),
        ["Night Cup", "Summer Slam"]
    );
    assert_eq!(
        names(TournamentFilter {
            q: Some("open".into()),
            ..Default::default()
        }),
        ["Steppe Open"]
    );
    assert_eq!(
        names(TournamentFilter {
            formats: vec![Format::Sixteen, Format::SixtyFour],
            ..Default::default()
        }),
        ["Night Cup", "Summer Slam"]
    );
    assert_eq!(
        names(TournamentFilter {
            levels: vec![level("3.5")],
            ..Default::default()
        }),
        ["Night Cup", "Summer Slam"]
    );
}
