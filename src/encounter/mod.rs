//! Encounter Scripts
//!
//! Scripted boss behavior layered on top of the combat engine:
//! - `EventScheduler`: the cooldown-ordered timer queue
//! - `inciter`: the Inciter boss controller and its spell script
//! - `charmed`: the substitute targeting policy for charmed players
//! - `announcements`: indexed yell lines and playback
//!
//! Scripts are wired up through `EncounterRegistry`: each script registers a
//! controller factory and a substitute-policy factory under a stable
//! encounter name, and its spell scripts against their spell ids. A script
//! whose spell ids fail validation rejects the whole registration.

use bevy::prelude::*;

use crate::combat::{SimPhase, TargetPolicy};
use crate::spells::{SpellDefinitions, SpellId, SpellScripts};

pub mod announcements;
pub mod charmed;
pub mod inciter;
pub mod scheduler;

pub use announcements::{AnnouncementEvent, InciterLine};
pub use charmed::CharmedPolicy;
pub use inciter::{
    inciter_script, BossEvent, EncounterPhase, InciterController, ReactState,
    INCITER_SCRIPT_NAME,
};
pub use scheduler::EventScheduler;

/// A named encounter script: how to build its controller and the substitute
/// policy it installs on charmed units.
#[derive(Clone, Copy)]
pub struct EncounterScript {
    pub name: &'static str,
    /// Display name of the adversary this script controls
    pub boss_name: &'static str,
    pub make_controller: fn() -> InciterController,
    pub make_charmed_policy: fn(Entity) -> Box<dyn TargetPolicy>,
}

/// Registry of encounter scripts, keyed by encounter name.
#[derive(Resource, Default)]
pub struct EncounterRegistry {
    scripts: std::collections::HashMap<&'static str, EncounterScript>,
}

impl EncounterRegistry {
    pub fn register(&mut self, script: EncounterScript) {
        self.scripts.insert(script.name, script);
    }

    pub fn get(&self, name: &str) -> Option<&EncounterScript> {
        self.scripts.get(name)
    }
}

/// Register every encounter script shipped by this crate.
///
/// Fails fast if any script's required spells do not resolve against the
/// loaded definitions; nothing is partially registered in that case.
pub fn register_encounter_scripts(
    registry: &mut EncounterRegistry,
    spell_scripts: &mut SpellScripts,
    definitions: &SpellDefinitions,
) -> Result<(), String> {
    spell_scripts.register(
        SpellId::InciteChaos,
        Box::new(inciter::InciteChaosRelay),
        definitions,
    )?;
    registry.register(inciter_script());
    Ok(())
}

/// Plugin wiring the encounter scripts into the simulation.
///
/// Requires `SpellConfigPlugin` to have run first (spell definitions must be
/// loaded for script validation).
pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AnnouncementEvent>();

        let world = app.world_mut();
        world.init_resource::<EncounterRegistry>();
        world.init_resource::<SpellScripts>();
        let result = world.resource_scope(|world, mut registry: Mut<EncounterRegistry>| {
            world.resource_scope(|world, mut scripts: Mut<SpellScripts>| {
                let definitions = world.resource::<SpellDefinitions>();
                register_encounter_scripts(&mut registry, &mut scripts, definitions)
            })
        });
        if let Err(e) = result {
            // Same contract as a bad spell config: abort the load
            panic!("Failed to register encounter scripts: {}", e);
        }

        app.add_systems(
            Update,
            inciter::update_inciter_ai
                .in_set(SimPhase::Behavior)
                .after(crate::combat::systems::update_player_behavior),
        )
        .add_systems(
            Update,
            (inciter::handle_kill_events, announcements::play_announcements)
                .chain()
                .in_set(SimPhase::Resolution)
                .after(crate::combat::systems::apply_pending_auras),
        );
    }
}
