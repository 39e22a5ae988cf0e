//! Integration tests for the Inciter encounter script
//!
//! These tests drive a full simulation App with manually advanced time and
//! verify the controller's observable behavior:
//! - Event seeding and timing on combat entry
//! - The Incite Chaos threat gate, charm handoff, and passive window
//! - The recovery guard and charm expiry
//! - Death teardown and announcements

use bevy::prelude::*;
use regex::Regex;

use encountersim::combat::{Boss, CharmRegistry, Charmed, EncounterLogEventType, Unit};
use encountersim::encounter::announcements::line_text;
use encountersim::encounter::{BossEvent, EncounterPhase, InciterController, InciterLine, ReactState};
use encountersim::headless::{advance_sim, build_encounter_app, HeadlessEncounterConfig};
use encountersim::EncounterLog;

fn build_app(party: &[&str], seed: u64) -> App {
    let mut config =
        HeadlessEncounterConfig::with_party(party.iter().map(|s| s.to_string()).collect());
    config.random_seed = Some(seed);
    build_encounter_app(&config).expect("valid config")
}

fn boss_entity(app: &mut App) -> Entity {
    let mut bosses = app.world_mut().query_filtered::<Entity, With<Boss>>();
    bosses.single(app.world())
}

fn controller<'a>(app: &'a App, boss: Entity) -> &'a InciterController {
    app.world().get::<InciterController>(boss).unwrap()
}

fn boss_unit<'a>(app: &'a App, boss: Entity) -> &'a Unit {
    app.world().get::<Unit>(boss).unwrap()
}

fn announcement_count(app: &App, line: InciterLine) -> usize {
    let text = line_text(line);
    app.world()
        .resource::<EncounterLog>()
        .filter_by_type(EncounterLogEventType::Announcement)
        .iter()
        .filter(|e| e.message.contains(text))
        .count()
}

// =============================================================================
// Combat Entry
// =============================================================================

#[test]
fn test_combat_entry_seeds_exactly_three_events() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 1);

    // Tick 1: first swings put the party on the threat list.
    // Tick 2: the controller notices and enters combat.
    advance_sim(&mut app, 0.2);

    let boss = boss_entity(&mut app);
    let controller = controller(&app, boss);

    assert_eq!(controller.phase, EncounterPhase::InCombat);
    assert_eq!(controller.react, ReactState::Aggressive);
    assert_eq!(controller.events.len(), 3);
    assert_eq!(controller.events.remaining(BossEvent::InciteChaos), Some(20.0));
    assert_eq!(controller.events.remaining(BossEvent::ChargeAttack), Some(5.0));
    assert_eq!(controller.events.remaining(BossEvent::WarStomp), Some(15.0));
}

#[test]
fn test_combat_entry_plays_aggro_line() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 1);
    advance_sim(&mut app, 0.2);

    assert_eq!(announcement_count(&app, InciterLine::Aggro), 1);

    let yell_format = Regex::new(r"^The Inciter yells: .+").unwrap();
    let log = app.world().resource::<EncounterLog>();
    for entry in log.filter_by_type(EncounterLogEventType::Announcement) {
        assert!(
            yell_format.is_match(&entry.message),
            "unexpected announcement format: {}",
            entry.message
        );
    }
}

// =============================================================================
// Early Rotation
// =============================================================================

#[test]
fn test_charge_fires_against_a_threat_list_target() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 3);
    advance_sim(&mut app, 6.0);

    let log = app.world().resource::<EncounterLog>();
    let charge_hits = log
        .filter_by_type(EncounterLogEventType::Damage)
        .iter()
        .filter(|e| e.message.contains("Charge hits"))
        .count();
    assert_eq!(charge_hits, 1, "charge fires once by the 6s mark");
}

#[test]
fn test_war_stomp_stuns_the_party() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 3);
    advance_sim(&mut app, 17.0);

    let log = app.world().resource::<EncounterLog>();
    assert!(log
        .entries
        .iter()
        .any(|e| e.message.contains("begins casting War Stomp")));
    assert!(log
        .entries
        .iter()
        .any(|e| e.message.contains("finishes casting War Stomp")));

    let stunned = log
        .filter_by_type(EncounterLogEventType::Aura)
        .iter()
        .filter(|e| e.message.contains("is stunned"))
        .count();
    assert_eq!(stunned, 3, "the stomp strikes every threat-list unit");
}

// =============================================================================
// Incite Chaos
// =============================================================================

#[test]
fn test_chaos_cast_charms_party_and_goes_passive() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 5);
    advance_sim(&mut app, 21.0);

    let boss = boss_entity(&mut app);
    assert_eq!(controller(&app, boss).react, ReactState::Passive);

    let charms = app.world().resource::<CharmRegistry>();
    assert_eq!(charms.controlled_count(boss), 3);

    // Every party member is under control, with the substitute policy slot
    let mut charmed = app
        .world_mut()
        .query_filtered::<&Charmed, Without<Boss>>();
    assert_eq!(charmed.iter(app.world()).count(), 3);
    for charm in charmed.iter(app.world()) {
        assert_eq!(charm.controller, boss);
    }

    // The compatibility workaround dropped the controller out of combat
    assert!(!boss_unit(&app, boss).in_combat);

    // The reschedule happened unconditionally at the fixed interval, and the
    // scheduler is frozen while the boss is passive
    assert_eq!(
        controller(&app, boss).events.remaining(BossEvent::InciteChaos),
        Some(40.0)
    );
}

#[test]
fn test_passive_window_suppresses_boss_activity() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 5);
    advance_sim(&mut app, 21.0);

    let boss = boss_entity(&mut app);
    assert_eq!(controller(&app, boss).react, ReactState::Passive);
    let dealt_before = boss_unit(&app, boss).damage_dealt;
    let taken_before = boss_unit(&app, boss).damage_taken;
    let player_damage_before: f32 = {
        let mut players = app.world_mut().query_filtered::<&Unit, Without<Boss>>();
        players.iter(app.world()).map(|u| u.damage_taken).sum()
    };

    // Deep inside the charm window the boss neither swings nor gets hit;
    // the charmed party fights itself instead.
    advance_sim(&mut app, 10.0);

    assert_eq!(controller(&app, boss).react, ReactState::Passive);
    assert_eq!(boss_unit(&app, boss).damage_dealt, dealt_before);
    assert_eq!(boss_unit(&app, boss).damage_taken, taken_before);

    let mut players = app.world_mut().query_filtered::<&Unit, Without<Boss>>();
    let player_damage_after: f32 = players.iter(app.world()).map(|u| u.damage_taken).sum();
    assert!(
        player_damage_after > player_damage_before,
        "charmed party members attack each other"
    );
}

#[test]
fn test_recovery_guard_restores_aggressive_after_charm_ends() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 5);

    // Charm lands around 20s and lasts 15s
    advance_sim(&mut app, 37.0);

    let boss = boss_entity(&mut app);
    assert_eq!(controller(&app, boss).react, ReactState::Aggressive);

    let charms = app.world().resource::<CharmRegistry>();
    assert_eq!(charms.controlled_count(boss), 0);

    let mut charmed = app
        .world_mut()
        .query_filtered::<&Charmed, Without<Boss>>();
    assert_eq!(charmed.iter(app.world()).count(), 0);

    // Autonomous action resumes
    let dealt_before = boss_unit(&app, boss).damage_dealt;
    advance_sim(&mut app, 3.0);
    assert!(boss_unit(&app, boss).damage_dealt > dealt_before);
}

#[test]
fn test_solo_party_skips_chaos_but_still_reschedules() {
    let mut app = build_app(&["Aldric"], 7);
    advance_sim(&mut app, 25.0);

    let boss = boss_entity(&mut app);
    assert_eq!(controller(&app, boss).react, ReactState::Aggressive);
    assert_eq!(app.world().resource::<CharmRegistry>().controlled_count(boss), 0);

    let log = app.world().resource::<EncounterLog>();
    assert!(
        log.entries.iter().all(|e| !e.message.contains("Incite Chaos")),
        "the cast is skipped with a single threat-list entry"
    );
    assert!(log.filter_by_type(EncounterLogEventType::Charm).is_empty());

    // The +40s reschedule still happened when the event fired around 20s
    let remaining = controller(&app, boss)
        .events
        .remaining(BossEvent::InciteChaos)
        .expect("chaos stays scheduled");
    assert!(
        (34.0..36.5).contains(&remaining),
        "expected ~35s remaining, got {}",
        remaining
    );
}

#[test]
fn test_passive_transition_stops_the_event_drain() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 11);
    advance_sim(&mut app, 0.2);

    let boss = boss_entity(&mut app);
    {
        let mut controller = app.world_mut().get_mut::<InciterController>(boss).unwrap();
        // Force the whole rotation due at once, chaos first in line
        controller.events.schedule(BossEvent::InciteChaos, 0.0);
        controller.events.schedule(BossEvent::ChargeAttack, 0.0);
        controller.events.schedule(BossEvent::WarStomp, 0.0);
    }

    advance_sim(&mut app, 0.1);

    // Chaos fired, flipped the boss passive, and the drain stopped: the
    // other due events are still pending and nothing else was cast.
    assert_eq!(controller(&app, boss).react, ReactState::Passive);
    assert!(controller(&app, boss)
        .events
        .remaining(BossEvent::ChargeAttack)
        .is_some());
    assert!(controller(&app, boss)
        .events
        .remaining(BossEvent::WarStomp)
        .is_some());

    let log = app.world().resource::<EncounterLog>();
    assert!(log.entries.iter().all(|e| !e.message.contains("Charge")));
    assert!(log.entries.iter().all(|e| !e.message.contains("War Stomp")));

    // And the melee fallback was suppressed on the same tick
    assert_eq!(boss_unit(&app, boss).damage_dealt, 0.0);
}

// =============================================================================
// Death
// =============================================================================

#[test]
fn test_boss_death_discards_events_and_announces_once() {
    let mut app = build_app(&["Aldric", "Brenna", "Corvin"], 13);
    advance_sim(&mut app, 0.2);

    let boss = boss_entity(&mut app);
    app.world_mut().get_mut::<Unit>(boss).unwrap().current_health = 1.0;

    // The next swing is lethal
    advance_sim(&mut app, 2.0);

    let controller = controller(&app, boss);
    assert_eq!(controller.phase, EncounterPhase::Dead);
    assert!(controller.events.is_empty(), "death discards pending events");
    assert!(!boss_unit(&app, boss).in_combat);
    assert_eq!(announcement_count(&app, InciterLine::Death), 1);

    // Dead is terminal: nothing further happens
    let entries_before = app.world().resource::<EncounterLog>().entries.len();
    advance_sim(&mut app, 5.0);
    let entries_after = app.world().resource::<EncounterLog>().entries.len();
    assert_eq!(entries_before, entries_after);
    assert_eq!(announcement_count(&app, InciterLine::Death), 1);
}

#[test]
fn test_slaying_a_player_plays_the_slay_line() {
    let mut app = build_app(&["Aldric"], 17);
    advance_sim(&mut app, 0.2);

    let mut players = app.world_mut().query_filtered::<&mut Unit, Without<Boss>>();
    players.single_mut(app.world_mut()).current_health = 1.0;

    advance_sim(&mut app, 1.0);

    assert_eq!(announcement_count(&app, InciterLine::Slay), 1);
}
