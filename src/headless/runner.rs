//! Headless encounter execution
//!
//! Runs encounters without any host server around them, suitable for
//! automated testing. The runner builds a bevy App from the registered
//! encounter script and advances virtual time in fixed steps, so runs are
//! deterministic under a seed and faster than real time.

use std::time::Duration;

use bevy::prelude::*;
use tracing::info;

use crate::combat::{
    BehaviorPolicy, Boss, CharmedPolicyProvider, CombatPlugin, DefaultPolicy, EncounterLog,
    EncounterLogEventType, EncounterMetadata, PartyMemberMetadata, SimRng, ThreatList, Unit,
};
use crate::encounter::{EncounterPlugin, EncounterRegistry};
use crate::spells::{SpellConfigPlugin, SpellPlugin};

use super::config::HeadlessEncounterConfig;

/// Fixed simulation timestep in seconds (10 ticks per simulated second).
pub const SIM_TICK: f32 = 0.1;

/// Result of a completed headless encounter
///
/// Provides programmatic access to the outcome for testing and analysis.
#[derive(Debug, Clone)]
pub struct EncounterResult {
    /// Whether the adversary was brought to zero health
    pub boss_defeated: bool,
    /// Whether every party member died first
    pub party_wiped: bool,
    /// Whether the run hit the duration cap with no decision
    pub timed_out: bool,
    /// Simulated encounter duration in seconds
    pub encounter_time: f32,
    /// Adversary health at the end of the run
    pub boss_final_health: f32,
    /// Per-member statistics
    pub party: Vec<PartyMemberResult>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Statistics for a single party member after the run
#[derive(Debug, Clone)]
pub struct PartyMemberResult {
    pub name: String,
    pub survived: bool,
    pub final_health: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

/// Build a ready-to-tick encounter App from a validated config.
///
/// The adversary and its controller come from the encounter registry; the
/// party spawns with the default behavior policy. Time is a plain resource
/// the caller advances manually (see `advance_sim`).
pub fn build_encounter_app(config: &HeadlessEncounterConfig) -> Result<App, String> {
    config.validate()?;

    let mut app = App::new();
    app.add_plugins((SpellConfigPlugin, CombatPlugin, SpellPlugin, EncounterPlugin));
    app.init_resource::<Time>();

    let rng = match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            SimRng::from_seed(seed)
        }
        None => SimRng::from_entropy(),
    };
    app.insert_resource(rng);

    let script = *app
        .world()
        .resource::<EncounterRegistry>()
        .get(&config.encounter)
        .ok_or_else(|| format!("Unknown encounter: '{}'", config.encounter))?;

    let world = app.world_mut();
    world.spawn((
        Boss,
        Unit::boss(script.boss_name),
        ThreatList::default(),
        (script.make_controller)(),
        CharmedPolicyProvider(script.make_charmed_policy),
    ));

    for name in &config.party {
        world.spawn((
            Unit::player(name.clone()),
            BehaviorPolicy(Box::new(DefaultPolicy)),
        ));
    }

    let mut log = world.resource_mut::<EncounterLog>();
    log.clear();
    log.log(
        EncounterLogEventType::EncounterEvent,
        format!(
            "Encounter started: {} ({} party members)",
            config.encounter,
            config.party.len()
        ),
    );

    Ok(app)
}

/// Advance the simulation by the given number of seconds, in fixed ticks.
pub fn advance_sim(app: &mut App, seconds: f32) {
    let ticks = (seconds / SIM_TICK).round() as u64;
    for _ in 0..ticks {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(SIM_TICK));
        app.update();
    }
}

/// Run a headless encounter to completion (kill, wipe, or timeout).
pub fn run_headless_encounter(config: HeadlessEncounterConfig) -> Result<EncounterResult, String> {
    info!(
        "Starting headless encounter '{}' with party {:?}",
        config.encounter, config.party
    );

    let mut app = build_encounter_app(&config)?;

    let max_ticks = (config.max_duration_secs / SIM_TICK).ceil() as u64;
    let mut boss_defeated = false;
    let mut party_wiped = false;

    for _ in 0..max_ticks {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(SIM_TICK));
        app.update();

        let world = app.world_mut();
        let mut bosses = world.query_filtered::<&Unit, With<Boss>>();
        boss_defeated = bosses.iter(world).all(|unit| !unit.is_alive());
        let mut players = world.query_filtered::<&Unit, Without<Boss>>();
        party_wiped = players.iter(world).all(|unit| !unit.is_alive());

        if boss_defeated || party_wiped {
            break;
        }
    }
    let timed_out = !boss_defeated && !party_wiped;

    let result = build_encounter_result(
        &mut app,
        &config,
        boss_defeated,
        party_wiped,
        timed_out,
    );
    save_encounter_log(&mut app, &config, &result);

    Ok(result)
}

/// Collect final unit state into an `EncounterResult`.
fn build_encounter_result(
    app: &mut App,
    config: &HeadlessEncounterConfig,
    boss_defeated: bool,
    party_wiped: bool,
    timed_out: bool,
) -> EncounterResult {
    let world = app.world_mut();
    let encounter_time = world.resource::<EncounterLog>().encounter_time;

    let mut bosses = world.query_filtered::<&Unit, With<Boss>>();
    let boss_final_health = bosses
        .iter(world)
        .map(|unit| unit.current_health)
        .next()
        .unwrap_or(0.0);

    let mut players = world.query_filtered::<&Unit, Without<Boss>>();
    let party = players
        .iter(world)
        .map(|unit| PartyMemberResult {
            name: unit.name.clone(),
            survived: unit.is_alive(),
            final_health: unit.current_health,
            damage_dealt: unit.damage_dealt,
            damage_taken: unit.damage_taken,
        })
        .collect();

    EncounterResult {
        boss_defeated,
        party_wiped,
        timed_out,
        encounter_time,
        boss_final_health,
        party,
        random_seed: config.random_seed,
    }
}

/// Save the encounter log to the configured output path, if any.
fn save_encounter_log(app: &mut App, config: &HeadlessEncounterConfig, result: &EncounterResult) {
    let Some(output_path) = &config.output_path else {
        return;
    };

    let world = app.world_mut();
    let mut players = world.query_filtered::<&Unit, Without<Boss>>();
    let party = players
        .iter(world)
        .map(|unit| PartyMemberMetadata {
            name: unit.name.clone(),
            max_health: unit.max_health,
            final_health: unit.current_health,
            survived: unit.is_alive(),
            damage_dealt: unit.damage_dealt,
            damage_taken: unit.damage_taken,
        })
        .collect();

    let metadata = EncounterMetadata {
        encounter: config.encounter.clone(),
        boss_defeated: result.boss_defeated,
        duration: result.encounter_time,
        party,
    };

    match world
        .resource::<EncounterLog>()
        .save_to_file(&metadata, output_path)
    {
        Ok(path) => {
            println!("Encounter complete. Log saved to: {}", path);
        }
        Err(e) => {
            eprintln!("Failed to save encounter log: {}", e);
        }
    }
}
