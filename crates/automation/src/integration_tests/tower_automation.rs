use crate::bindings::TowerCommand;
use crate::host::{AutomationFeedback, TowerKind};
use crate::test_harness::TestRealm;
use crate::towers::TowerPhase;

fn tower_feedback(feedback: &[AutomationFeedback]) -> usize {
    feedback
        .iter()
        .filter(|f| matches!(f, AutomationFeedback::TowerToggled { .. }))
        .count()
}

#[test]
fn invasion_opens_every_kind_of_closed_tower() {
    let mut realm = TestRealm::new();
    let towers: Vec<_> = TowerKind::ALL
        .iter()
        .map(|&kind| realm.build_tower(kind, false))
        .collect();
    realm.start_raid();
    realm.tick(1);

    assert_eq!(realm.tower_controller().phase(), TowerPhase::Engaged);
    for tower in &towers {
        assert!(realm.tower_is_open(*tower));
    }
    assert_eq!(realm.tower_controller().opened_towers().len(), 4);
    assert_eq!(tower_feedback(&realm.take_feedback()), 4);
}

#[test]
fn already_open_tower_is_never_tracked_or_closed() {
    let mut realm = TestRealm::new();
    let player_open = realm.build_tower(TowerKind::Archer, true);
    let closed = realm.build_tower(TowerKind::Archer, false);
    realm.spawn_dragon();
    realm.tick(1);

    assert_eq!(realm.tower_controller().opened_towers(), &[closed]);

    realm.end_invasion();
    realm.tick(1);
    assert_eq!(realm.tower_controller().phase(), TowerPhase::Idle);
    assert!(realm.tower_controller().opened_towers().is_empty());
    assert!(realm.tower_is_open(player_open));
    assert!(!realm.tower_is_open(closed));
}

#[test]
fn opened_towers_follow_kind_then_entity_order() {
    let mut realm = TestRealm::new();
    let cannon = realm.build_tower(TowerKind::Cannon, false);
    let cauldron = realm.build_tower(TowerKind::SiegeCauldron, false);
    let archer_a = realm.build_tower(TowerKind::Archer, false);
    let archer_b = realm.build_tower(TowerKind::Archer, false);
    realm.start_raid();
    realm.tick(1);

    assert_eq!(
        realm.tower_controller().opened_towers(),
        &[archer_a, archer_b, cauldron, cannon]
    );
}

#[test]
fn towers_stay_open_for_the_whole_invasion() {
    let mut realm = TestRealm::new();
    let tower = realm.build_tower(TowerKind::Ballista, false);
    realm.start_raid();
    realm.tick(30);
    assert!(realm.tower_is_open(tower));
    assert_eq!(tower_feedback(&realm.take_feedback()), 1);
}

#[test]
fn demolished_tower_does_not_block_closing_the_rest() {
    let mut realm = TestRealm::new();
    let doomed = realm.build_tower(TowerKind::Archer, false);
    let survivor = realm.build_tower(TowerKind::Cannon, false);
    realm.start_raid();
    realm.tick(1);

    realm.demolish_tower(doomed);
    realm.end_invasion();
    realm.tick(1);

    assert_eq!(realm.tower_controller().phase(), TowerPhase::Idle);
    assert!(!realm.tower_is_open(survivor));
}

#[test]
fn tower_built_mid_invasion_is_not_auto_opened() {
    let mut realm = TestRealm::new();
    realm.start_raid();
    realm.tick(1);
    let late = realm.build_tower(TowerKind::Archer, false);
    realm.tick(5);
    assert!(!realm.tower_is_open(late));
}

#[test]
fn open_all_without_invasion_is_not_tracked() {
    let mut realm = TestRealm::new();
    let a = realm.build_tower(TowerKind::Archer, false);
    let b = realm.build_tower(TowerKind::Ballista, false);
    realm.send_tower_command(TowerCommand::OpenAll);
    realm.tick(1);

    assert!(realm.tower_is_open(a));
    assert!(realm.tower_is_open(b));
    assert_eq!(realm.tower_controller().phase(), TowerPhase::Idle);
    assert!(realm.tower_controller().opened_towers().is_empty());

    // An invasion and its end never close towers the player opened.
    realm.start_raid();
    realm.tick(1);
    realm.end_invasion();
    realm.tick(1);
    assert!(realm.tower_is_open(a));
    assert!(realm.tower_is_open(b));
}

#[test]
fn open_all_twice_gives_one_feedback_per_tower() {
    let mut realm = TestRealm::new();
    realm.build_tower(TowerKind::Archer, false);
    realm.build_tower(TowerKind::Cannon, true);
    realm.send_tower_command(TowerCommand::OpenAll);
    realm.tick(1);
    realm.send_tower_command(TowerCommand::OpenAll);
    realm.tick(1);

    assert_eq!(tower_feedback(&realm.take_feedback()), 1);
}

#[test]
fn close_all_mid_invasion_leaves_bookkeeping() {
    let mut realm = TestRealm::new();
    let a = realm.build_tower(TowerKind::Archer, false);
    let b = realm.build_tower(TowerKind::Ballista, true);
    realm.start_raid();
    realm.tick(1);
    realm.take_feedback();

    realm.send_tower_command(TowerCommand::CloseAll);
    realm.tick(1);
    assert!(!realm.tower_is_open(a));
    assert!(!realm.tower_is_open(b));
    assert_eq!(realm.tower_controller().opened_towers(), &[a]);

    // Closing at invasion end is a no-op for towers already closed.
    realm.end_invasion();
    realm.tick(1);
    assert_eq!(realm.tower_controller().phase(), TowerPhase::Idle);
    assert_eq!(tower_feedback(&realm.take_feedback()), 2);
}

#[test]
fn disabled_tower_automation_never_opens() {
    let mut realm = TestRealm::new().with_tower_automation(false);
    let tower = realm.build_tower(TowerKind::SiegeCauldron, false);
    realm.start_raid();
    realm.tick(5);

    assert!(!realm.tower_is_open(tower));
    assert_eq!(realm.tower_controller().phase(), TowerPhase::Idle);
    assert!(realm.take_feedback().is_empty());
}

#[test]
fn disabling_mid_invasion_forgets_opened_towers() {
    let mut realm = TestRealm::new();
    let tower = realm.build_tower(TowerKind::Archer, false);
    realm.start_raid();
    realm.tick(1);

    realm.set_tower_automation(false);
    realm.end_invasion();
    realm.tick(1);
    assert_eq!(realm.tower_controller().phase(), TowerPhase::Idle);
    assert!(realm.tower_controller().opened_towers().is_empty());
    assert!(realm.tower_is_open(tower), "no tower mutation while disabled");
}

#[test]
fn manual_buttons_work_while_automation_disabled() {
    let mut realm = TestRealm::new().with_tower_automation(false);
    let tower = realm.build_tower(TowerKind::Cannon, false);
    realm.send_tower_command(TowerCommand::OpenAll);
    realm.tick(1);
    assert!(realm.tower_is_open(tower));

    realm.set_tower_open(tower, true);
    realm.send_tower_command(TowerCommand::CloseAll);
    realm.tick(1);
    assert!(!realm.tower_is_open(tower));
}
