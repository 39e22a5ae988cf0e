//! Spell subsystem
//!
//! Handles everything between "an AI decided to cast" and "units got hit":
//! - `CastRequest` events (the casting entry point for AI code)
//! - Cast-time tracking via the `CastingState` component
//! - Hit resolution against the spell's targeting mode
//! - Mechanical effects (damage, stun, charm) and per-spell script hooks
//!
//! Spell data lives in `assets/config/spells.ron` (see `config`); script
//! hooks are registered at load time (see `scripts`).

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::combat::{
    Aura, AuraKind, AuraPending, DamageEvent, EncounterLog, EncounterLogEventType, SimPhase,
    SimRng, ThreatList, Unit,
};

pub mod config;
pub mod scripts;

pub use config::{
    load_spell_definitions, SpellConfig, SpellConfigPlugin, SpellDefinitions, SpellEffect,
    SpellId, SpellTargeting,
};
pub use scripts::{SpellScript, SpellScripts};

/// Where a cast is aimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastTarget {
    Caster,
    Unit(Entity),
}

/// Request to cast a spell. The casting entry point for all AI code.
#[derive(Event, Clone, Copy, Debug)]
pub struct CastRequest {
    pub caster: Entity,
    pub target: CastTarget,
    pub spell: SpellId,
    /// Triggered casts resolve instantly and silently, without a cast bar
    pub triggered: bool,
}

/// Event fired for each unit a resolved spell strikes.
#[derive(Event, Clone, Copy, Debug)]
pub struct SpellHitEvent {
    pub caster: Entity,
    pub target: Entity,
    pub spell: SpellId,
}

/// Component tracking an active cast in progress.
#[derive(Component)]
pub struct CastingState {
    pub spell: SpellId,
    pub target: CastTarget,
    /// Time remaining until the cast completes (in seconds)
    pub time_remaining: f32,
}

/// Plugin for cast processing and hit resolution
pub struct SpellPlugin;

impl Plugin for SpellPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CastRequest>()
            .add_event::<SpellHitEvent>()
            .add_systems(
                Update,
                (process_cast_requests, advance_casts, apply_spell_hits)
                    .chain()
                    .in_set(SimPhase::SpellResolution),
            );
    }
}

/// Turn cast requests into either an in-flight `CastingState` or, for
/// instant and triggered casts, immediate spell hits.
pub fn process_cast_requests(
    mut requests: EventReader<CastRequest>,
    mut commands: Commands,
    definitions: Res<SpellDefinitions>,
    threat_lists: Query<&ThreatList>,
    units: Query<&Unit>,
    mut hits: EventWriter<SpellHitEvent>,
    mut log: ResMut<EncounterLog>,
) {
    for request in requests.read() {
        let def = definitions.get_unchecked(request.spell);
        let Ok(caster) = units.get(request.caster) else {
            continue;
        };
        if !caster.is_alive() {
            continue;
        }

        if !request.triggered && def.cast_time > 0.0 {
            log.log(
                EncounterLogEventType::SpellCast,
                format!("{} begins casting {}", caster.name, def.name),
            );
            commands.entity(request.caster).insert(CastingState {
                spell: request.spell,
                target: request.target,
                time_remaining: def.cast_time,
            });
        } else {
            if !request.triggered {
                log.log(
                    EncounterLogEventType::SpellCast,
                    format!("{} casts {}", caster.name, def.name),
                );
            }
            for hit in resolve_hits(
                request.caster,
                request.target,
                request.spell,
                def,
                &threat_lists,
                &units,
            ) {
                hits.send(hit);
            }
        }
    }
}

/// Tick down in-flight casts and resolve the ones that complete.
/// A dead caster's cast is cancelled, never resolved.
pub fn advance_casts(
    time: Res<Time>,
    mut commands: Commands,
    definitions: Res<SpellDefinitions>,
    mut casting: Query<(Entity, &mut CastingState)>,
    threat_lists: Query<&ThreatList>,
    units: Query<&Unit>,
    mut hits: EventWriter<SpellHitEvent>,
    mut log: ResMut<EncounterLog>,
) {
    let dt = time.delta_secs();

    for (entity, mut cast) in casting.iter_mut() {
        let caster_alive = units.get(entity).map(|u| u.is_alive()).unwrap_or(false);
        if !caster_alive {
            commands.entity(entity).remove::<CastingState>();
            continue;
        }

        cast.time_remaining -= dt;
        if cast.time_remaining > 0.0 {
            continue;
        }

        commands.entity(entity).remove::<CastingState>();

        let def = definitions.get_unchecked(cast.spell);
        if let Ok(caster) = units.get(entity) {
            log.log(
                EncounterLogEventType::SpellCast,
                format!("{} finishes casting {}", caster.name, def.name),
            );
        }
        for hit in resolve_hits(entity, cast.target, cast.spell, def, &threat_lists, &units) {
            hits.send(hit);
        }
    }
}

/// Apply the mechanical effect of every spell hit this tick and run the
/// spell's script hook, if any.
///
/// Casts a script pushes back are resolved inline as triggered casts, so a
/// hit-effect chain (chaos strike -> companion debuff) completes within the
/// same tick without disturbing the original cast.
pub fn apply_spell_hits(
    mut hit_events: EventReader<SpellHitEvent>,
    mut commands: Commands,
    definitions: Res<SpellDefinitions>,
    scripts: Res<SpellScripts>,
    mut rng: ResMut<SimRng>,
    threat_lists: Query<&ThreatList>,
    units: Query<&Unit>,
    mut damage: EventWriter<DamageEvent>,
) {
    let mut queue: VecDeque<SpellHitEvent> = hit_events.read().copied().collect();

    while let Some(hit) = queue.pop_front() {
        let def = definitions.get_unchecked(hit.spell);
        let target_alive = units.get(hit.target).map(|u| u.is_alive()).unwrap_or(false);
        if !target_alive {
            continue;
        }

        match def.effect {
            SpellEffect::Damage { base_min, base_max } => {
                let amount = rng.random_range(base_min, base_max);
                damage.send(DamageEvent {
                    source: hit.caster,
                    target: hit.target,
                    amount,
                    ability_name: Some(def.name.clone()),
                });
            }
            SpellEffect::Stun { duration } => {
                commands.spawn(AuraPending {
                    target: hit.target,
                    aura: Aura {
                        kind: AuraKind::Stun,
                        spell: hit.spell,
                        caster: hit.caster,
                        time_remaining: duration,
                    },
                });
            }
            SpellEffect::Charm { duration } => {
                commands.spawn(AuraPending {
                    target: hit.target,
                    aura: Aura {
                        kind: AuraKind::Charm,
                        spell: hit.spell,
                        caster: hit.caster,
                        time_remaining: duration,
                    },
                });
            }
            SpellEffect::ScriptEffect => {}
        }

        if let Some(script) = scripts.get(hit.spell) {
            let mut triggered = Vec::new();
            script.on_hit(&hit, &mut triggered);
            for request in triggered {
                let def = definitions.get_unchecked(request.spell);
                for follow_up in resolve_hits(
                    request.caster,
                    request.target,
                    request.spell,
                    def,
                    &threat_lists,
                    &units,
                ) {
                    queue.push_back(follow_up);
                }
            }
        }
    }
}

/// Compute the units a resolved cast strikes, per the spell's targeting mode.
/// Only alive units are struck; a threat-list cast reads the caster's list.
fn resolve_hits(
    caster: Entity,
    target: CastTarget,
    spell: SpellId,
    def: &SpellConfig,
    threat_lists: &Query<&ThreatList>,
    units: &Query<&Unit>,
) -> Vec<SpellHitEvent> {
    let alive = |entity: Entity| units.get(entity).map(|u| u.is_alive()).unwrap_or(false);

    match def.targeting {
        SpellTargeting::SelfCast => {
            if alive(caster) {
                vec![SpellHitEvent {
                    caster,
                    target: caster,
                    spell,
                }]
            } else {
                Vec::new()
            }
        }
        SpellTargeting::SingleUnit => {
            let unit = match target {
                CastTarget::Unit(unit) => unit,
                CastTarget::Caster => caster,
            };
            if alive(unit) {
                vec![SpellHitEvent {
                    caster,
                    target: unit,
                    spell,
                }]
            } else {
                Vec::new()
            }
        }
        SpellTargeting::ThreatList => threat_lists
            .get(caster)
            .map(|threat| {
                threat
                    .units()
                    .filter(|&unit| alive(unit))
                    .map(|unit| SpellHitEvent {
                        caster,
                        target: unit,
                        spell,
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}
