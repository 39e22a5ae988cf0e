//! Integration tests for headless encounter execution
//!
//! These tests verify that:
//! - Headless encounters run to completion
//! - Encounter results are accessible programmatically
//! - Seeded RNG produces deterministic results

use encountersim::headless::{run_headless_encounter, HeadlessEncounterConfig};

fn create_config(party: Vec<&str>, seed: Option<u64>) -> HeadlessEncounterConfig {
    let mut config =
        HeadlessEncounterConfig::with_party(party.into_iter().map(String::from).collect());
    config.max_duration_secs = 60.0; // Short duration for tests
    config.random_seed = seed;
    config
}

#[test]
fn test_encounter_runs_to_completion() {
    let config = create_config(vec!["Aldric", "Brenna", "Corvin"], Some(12345));
    let result = run_headless_encounter(config).expect("encounter runs");

    assert!(result.encounter_time > 0.0);
    assert!(result.encounter_time <= 60.5);
    assert_eq!(result.party.len(), 3);
    assert_eq!(result.random_seed, Some(12345));
    // Exactly one outcome holds
    assert_eq!(
        result.timed_out,
        !(result.boss_defeated || result.party_wiped)
    );
}

#[test]
fn test_party_member_names_are_preserved() {
    let config = create_config(vec!["Aldric", "Brenna"], Some(2));
    let result = run_headless_encounter(config).expect("encounter runs");

    let names: Vec<&str> = result.party.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Aldric", "Brenna"]);
}

#[test]
fn test_seeded_runs_are_deterministic() {
    let run = || {
        let config = create_config(vec!["Aldric", "Brenna", "Corvin"], Some(777));
        run_headless_encounter(config).expect("encounter runs")
    };

    let first = run();
    let second = run();

    assert_eq!(first.encounter_time, second.encounter_time);
    assert_eq!(first.boss_defeated, second.boss_defeated);
    assert_eq!(first.party_wiped, second.party_wiped);
    assert_eq!(first.boss_final_health, second.boss_final_health);
    for (a, b) in first.party.iter().zip(second.party.iter()) {
        assert_eq!(a.final_health, b.final_health);
        assert_eq!(a.damage_dealt, b.damage_dealt);
        assert_eq!(a.damage_taken, b.damage_taken);
    }
}

#[test]
fn test_solo_player_eventually_wipes() {
    let mut config = create_config(vec!["Aldric"], Some(4));
    config.max_duration_secs = 240.0;
    let result = run_headless_encounter(config).expect("encounter runs");

    assert!(result.party_wiped, "a lone player cannot outlast the boss");
    assert!(!result.boss_defeated);
    assert!(!result.party[0].survived);
}

#[test]
fn test_unknown_encounter_is_rejected() {
    let mut config = create_config(vec!["Aldric"], None);
    config.encounter = "no-such-script".to_string();

    let result = run_headless_encounter(config);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("no-such-script"));
}

#[test]
fn test_invalid_party_is_rejected() {
    let config = create_config(vec![], None);
    assert!(run_headless_encounter(config).is_err());
}
