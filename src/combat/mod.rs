//! Combat engine
//!
//! Implements the combat mechanics the encounter scripts are layered on:
//! - Units with health, melee swing timers, and combat-state flags
//! - The adversary's threat list, ordered by standing
//! - The charm relation registry and behavior-policy slots
//! - Timed status effects (stun, charm)
//! - Encounter logging

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod log;
pub mod systems;

pub use components::*;
pub use events::*;
pub use log::{EncounterLog, EncounterLogEventType, EncounterMetadata, PartyMemberMetadata};

/// System phases for one simulation tick.
///
/// All combat, spell, and encounter systems run chained inside these sets so
/// a tick always resolves in the same order: timers and aura expiry first,
/// then behavior decisions, then spell resolution, then damage and deaths.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimPhase {
    /// Timer updates, aura expiry, charm teardown
    AurasAndTimers,
    /// Target selection and ability decisions (players, then the adversary)
    Behavior,
    /// Cast processing, spell hits, aura application
    SpellResolution,
    /// Damage application, threat accounting, death detection
    Resolution,
}

/// Plugin for the combat engine
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Combat events
            .add_event::<DamageEvent>()
            .add_event::<UnitKilledEvent>()
            // Resources
            .init_resource::<EncounterLog>()
            .init_resource::<CharmRegistry>()
            .init_resource::<SimRng>()
            // Phase ordering for the whole simulation tick
            .configure_sets(
                Update,
                (
                    SimPhase::AurasAndTimers,
                    SimPhase::Behavior,
                    SimPhase::SpellResolution,
                    SimPhase::Resolution,
                )
                    .chain(),
            )
            // Systems
            .add_systems(
                Update,
                (
                    systems::advance_log_clock,
                    systems::tick_swing_timers,
                    systems::tick_auras,
                )
                    .chain()
                    .in_set(SimPhase::AurasAndTimers),
            )
            .add_systems(
                Update,
                systems::update_player_behavior.in_set(SimPhase::Behavior),
            )
            // Damage lands before pending auras: a charm landing this tick
            // clears combat flags last, after the tick's swings resolved.
            .add_systems(
                Update,
                (systems::apply_damage_events, systems::apply_pending_auras)
                    .chain()
                    .in_set(SimPhase::Resolution),
            );
    }
}
