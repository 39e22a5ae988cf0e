//! Combat events
//!
//! Defines the events that flow between combat, spell, and encounter systems
//! within a single tick.

use bevy::prelude::*;

/// Event fired when damage is dealt (melee swing or spell).
#[derive(Event, Clone, Debug)]
pub struct DamageEvent {
    /// Entity dealing the damage
    pub source: Entity,
    /// Entity receiving the damage
    pub target: Entity,
    /// Amount of damage
    pub amount: f32,
    /// Name of the spell that caused the damage (None for a melee swing)
    pub ability_name: Option<String>,
}

/// Event fired when a unit dies.
#[derive(Event, Clone, Copy, Debug)]
pub struct UnitKilledEvent {
    /// Entity that died
    pub victim: Entity,
    /// Entity that dealt the killing blow
    pub killer: Entity,
}
