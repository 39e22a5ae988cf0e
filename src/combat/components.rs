//! Component Definitions for the Combat Engine
//!
//! This module contains the ECS components and resources that model the
//! combat-engine side of an encounter: units, the threat list, the charm
//! registry, behavior policies, and timed status effects (auras).
//!
//! Encounter scripts only *read* threat and charm state; both are owned and
//! mutated by the systems in `combat::systems`.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use smallvec::SmallVec;

use crate::spells::SpellId;

// ============================================================================
// Resources
// ============================================================================

/// Seeded random number generator for deterministic encounter simulation.
///
/// When a seed is provided (e.g., via headless config), the same seed will
/// always produce the same encounter. Without a seed, uses system entropy.
#[derive(Resource)]
pub struct SimRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl SimRng {
    /// Create a new SimRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new SimRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Pick a random index into a collection of the given length.
    /// Panics if `len` is zero.
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Charm relation registry, keyed by controller.
///
/// Maintained exclusively by the charm apply/expire systems in
/// `combat::systems`. Readers (the recovery guard, the charmed targeting
/// policy) must query it fresh on every access rather than caching the
/// controlled set across ticks.
#[derive(Resource, Default)]
pub struct CharmRegistry {
    controlled: HashMap<Entity, Vec<Entity>>,
}

impl CharmRegistry {
    pub fn add(&mut self, controller: Entity, unit: Entity) {
        let controlled = self.controlled.entry(controller).or_default();
        if !controlled.contains(&unit) {
            controlled.push(unit);
        }
    }

    pub fn remove(&mut self, controller: Entity, unit: Entity) {
        if let Some(controlled) = self.controlled.get_mut(&controller) {
            controlled.retain(|&u| u != unit);
            if controlled.is_empty() {
                self.controlled.remove(&controller);
            }
        }
    }

    /// Units currently controlled by the given controller.
    pub fn controlled_by(&self, controller: Entity) -> &[Entity] {
        self.controlled
            .get(&controller)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn controlled_count(&self, controller: Entity) -> usize {
        self.controlled_by(controller).len()
    }
}

// ============================================================================
// Unit Components
// ============================================================================

/// Marker component for the encounter adversary.
#[derive(Component)]
pub struct Boss;

/// Core unit component: health, melee swing stats, and combat bookkeeping.
#[derive(Component, Clone)]
pub struct Unit {
    /// Display name (used in the encounter log)
    pub name: String,
    /// Whether this unit is a player character
    pub is_player: bool,
    pub max_health: f32,
    pub current_health: f32,
    /// Melee swing damage range
    pub attack_damage_min: f32,
    pub attack_damage_max: f32,
    /// Seconds between melee swings
    pub attack_interval: f32,
    /// Time remaining until the next swing is ready
    pub attack_timer: f32,
    /// Combat-state flag owned by the combat engine
    pub in_combat: bool,
    /// Total damage this unit has dealt
    pub damage_dealt: f32,
    /// Total damage this unit has taken
    pub damage_taken: f32,
}

impl Unit {
    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_player: true,
            max_health: 700.0,
            current_health: 700.0,
            attack_damage_min: 9.0,
            attack_damage_max: 14.0,
            attack_interval: 1.5,
            attack_timer: 0.0,
            in_combat: false,
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    pub fn boss(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_player: false,
            max_health: 3500.0,
            current_health: 3500.0,
            attack_damage_min: 18.0,
            attack_damage_max: 26.0,
            attack_interval: 2.0,
            attack_timer: 0.0,
            in_combat: false,
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    /// Check if this unit is alive (health > 0).
    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    /// Whether the melee swing timer allows an attack this tick.
    pub fn melee_ready(&self) -> bool {
        self.attack_timer <= 0.0
    }

    /// Reset the swing timer after an attack.
    pub fn reset_swing(&mut self) {
        self.attack_timer = self.attack_interval;
    }
}

// ============================================================================
// Threat
// ============================================================================

/// A single threat-list entry: a unit and its accumulated threat.
#[derive(Clone, Copy, Debug)]
pub struct ThreatEntry {
    pub unit: Entity,
    pub threat: f32,
}

/// Threat list component on the adversary, ordered by standing.
///
/// Owned by the combat engine: entries are added when units damage the
/// owner and removed when they die or the encounter tears down.
#[derive(Component, Default)]
pub struct ThreatList {
    entries: SmallVec<[ThreatEntry; 8]>,
}

impl ThreatList {
    /// Add threat for a unit, inserting it if not yet present.
    /// Entries stay sorted by threat, highest first; ties keep insertion order.
    pub fn add_threat(&mut self, unit: Entity, amount: f32) {
        match self.entries.iter_mut().find(|e| e.unit == unit) {
            Some(entry) => entry.threat += amount,
            None => self.entries.push(ThreatEntry {
                unit,
                threat: amount,
            }),
        }
        self.entries.sort_by(|a, b| {
            b.threat
                .partial_cmp(&a.threat)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    pub fn remove(&mut self, unit: Entity) {
        self.entries.retain(|e| e.unit != unit);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The highest-standing unit on the list, if any.
    pub fn victim(&self) -> Option<Entity> {
        self.entries.first().map(|e| e.unit)
    }

    pub fn units(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entries.iter().map(|e| e.unit)
    }
}

// ============================================================================
// Behavior Policies
// ============================================================================

/// Read-only view of the combat state a targeting policy may consult.
/// Built fresh every tick so policies never act on stale relations.
pub struct TargetContext<'a> {
    /// The unit making the decision
    pub self_entity: Entity,
    /// The encounter adversary, if it is still alive
    pub boss: Option<Entity>,
    /// The charm relation registry
    pub charms: &'a CharmRegistry,
    /// All currently alive units
    pub alive: &'a HashSet<Entity>,
}

/// Target-selection capability of a unit.
///
/// Every unit carries exactly one active policy: the default one, or a
/// substitute installed for the lifetime of a charm. Policies are swapped
/// atomically with the charm relation and must re-check the registry on
/// every call.
pub trait TargetPolicy: Send + Sync + 'static {
    fn select_attack_target(&self, ctx: &TargetContext, rng: &mut SimRng) -> Option<Entity>;
}

/// The active behavior policy slot of a unit.
#[derive(Component)]
pub struct BehaviorPolicy(pub Box<dyn TargetPolicy>);

/// Default player behavior: fight the encounter adversary.
pub struct DefaultPolicy;

impl TargetPolicy for DefaultPolicy {
    fn select_attack_target(&self, ctx: &TargetContext, _rng: &mut SimRng) -> Option<Entity> {
        ctx.boss
    }
}

/// Marker on a unit currently under another unit's control.
#[derive(Component)]
pub struct Charmed {
    pub controller: Entity,
}

/// Factory for the substitute policy installed on units the owner charms.
/// Placed on the controller; consulted by the charm application system.
#[derive(Component)]
pub struct CharmedPolicyProvider(pub fn(Entity) -> Box<dyn TargetPolicy>);

// ============================================================================
// Auras
// ============================================================================

/// Kinds of timed status effects.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuraKind {
    /// Prevents melee swings for the duration
    Stun,
    /// Places the unit under the caster's control for the duration
    Charm,
}

/// A timed status effect on a unit.
#[derive(Clone)]
pub struct Aura {
    pub kind: AuraKind,
    /// The spell that applied this aura (for logging)
    pub spell: SpellId,
    /// Who applied it; charms break when the caster dies
    pub caster: Entity,
    pub time_remaining: f32,
}

/// Component tracking active auras on a unit.
#[derive(Component, Default)]
pub struct ActiveAuras {
    pub auras: Vec<Aura>,
}

impl ActiveAuras {
    pub fn has(&self, kind: AuraKind) -> bool {
        self.auras.iter().any(|a| a.kind == kind)
    }
}

/// Temporary entity for auras waiting to be applied.
/// Spawned by spell resolution, consumed by `apply_pending_auras`.
#[derive(Component)]
pub struct AuraPending {
    pub target: Entity,
    pub aura: Aura,
}
