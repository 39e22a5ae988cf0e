//! Combat Engine Systems
//!
//! Owns the state the encounter scripts only read:
//! - swing timers and melee execution for player units
//! - aura durations, charm application and expiry
//! - damage application, threat accounting, and death detection
//!
//! Encounter-script systems (the boss controller) run between
//! `update_player_behavior` and spell resolution; see `combat::SimPhase`.

use std::collections::HashSet;

use bevy::prelude::*;
use tracing::info;

use super::components::*;
use super::events::*;
use super::log::{EncounterLog, EncounterLogEventType};

/// Advance the encounter-log clock. Runs first every tick so all entries
/// logged this tick share the same timestamp.
pub fn advance_log_clock(time: Res<Time>, mut log: ResMut<EncounterLog>) {
    log.encounter_time += time.delta_secs();
}

/// Tick down melee swing timers for every unit.
///
/// Swing readiness is owned here; behavior systems only check
/// `melee_ready()` and call `reset_swing()` when they attack.
pub fn tick_swing_timers(time: Res<Time>, mut units: Query<&mut Unit>) {
    let dt = time.delta_secs();
    for mut unit in units.iter_mut() {
        if unit.attack_timer > 0.0 {
            unit.attack_timer -= dt;
        }
    }
}

/// Update all active auras: tick down durations and remove ended ones.
///
/// Charm auras end early when the controller dies or the bearer dies; ending
/// a charm tears down the relation (registry entry, `Charmed` marker) and
/// restores the default behavior policy. The substitute policy instance is
/// dropped with the overwritten component.
pub fn tick_auras(
    time: Res<Time>,
    mut commands: Commands,
    mut affected: Query<(Entity, &mut ActiveAuras)>,
    units: Query<&Unit>,
    mut charms: ResMut<CharmRegistry>,
    mut log: ResMut<EncounterLog>,
) {
    let dt = time.delta_secs();

    for (entity, mut auras) in affected.iter_mut() {
        let bearer_alive = units.get(entity).map(|u| u.is_alive()).unwrap_or(false);

        for aura in auras.auras.iter_mut() {
            aura.time_remaining -= dt;
        }

        let mut ended: Vec<Aura> = Vec::new();
        auras.auras.retain(|aura| {
            let caster_alive = units
                .get(aura.caster)
                .map(|u| u.is_alive())
                .unwrap_or(false);
            let keep = bearer_alive
                && aura.time_remaining > 0.0
                && (aura.kind != AuraKind::Charm || caster_alive);
            if !keep {
                ended.push(aura.clone());
            }
            keep
        });

        for aura in ended {
            if aura.kind == AuraKind::Charm {
                charms.remove(aura.caster, entity);
                commands.entity(entity).remove::<Charmed>();
                commands
                    .entity(entity)
                    .insert(BehaviorPolicy(Box::new(DefaultPolicy)));
                if let Ok(unit) = units.get(entity) {
                    log.log(
                        EncounterLogEventType::Charm,
                        format!("{} is no longer under control", unit.name),
                    );
                }
            }
        }

        if auras.auras.is_empty() {
            commands.entity(entity).remove::<ActiveAuras>();
        }
    }
}

/// Per-tick player behavior: pick an attack target through the unit's active
/// policy and swing when the timer allows.
///
/// The target context is rebuilt from live ECS state every tick; policies
/// never see a cached charm relation or a stale controller reference.
pub fn update_player_behavior(
    mut rng: ResMut<SimRng>,
    charms: Res<CharmRegistry>,
    mut players: Query<(Entity, &mut Unit, &BehaviorPolicy, Option<&ActiveAuras>), Without<Boss>>,
    bosses: Query<(Entity, &Unit), With<Boss>>,
    mut damage: EventWriter<DamageEvent>,
) {
    let mut alive: HashSet<Entity> = players
        .iter()
        .filter(|(_, unit, _, _)| unit.is_alive())
        .map(|(entity, ..)| entity)
        .collect();
    let boss = bosses
        .iter()
        .find(|(_, unit)| unit.is_alive())
        .map(|(entity, _)| entity);
    if let Some(boss) = boss {
        alive.insert(boss);
    }

    for (entity, mut unit, policy, auras) in players.iter_mut() {
        if !unit.is_alive() {
            continue;
        }
        // Stunned units skip their swing entirely
        if auras.map(|a| a.has(AuraKind::Stun)).unwrap_or(false) {
            continue;
        }

        let ctx = TargetContext {
            self_entity: entity,
            boss,
            charms: &charms,
            alive: &alive,
        };
        let Some(target) = policy.0.select_attack_target(&ctx, &mut rng) else {
            continue;
        };

        if unit.melee_ready() {
            let amount = rng.random_range(unit.attack_damage_min, unit.attack_damage_max);
            unit.reset_swing();
            unit.in_combat = true;
            damage.send(DamageEvent {
                source: entity,
                target,
                amount,
                ability_name: None,
            });
        }
    }
}

/// Apply queued auras to their targets.
///
/// Charm auras additionally establish the control relation: registry entry,
/// `Charmed` marker, and the substitute policy provided by the controller.
pub fn apply_pending_auras(
    mut commands: Commands,
    pending: Query<(Entity, &AuraPending)>,
    mut affected: Query<&mut ActiveAuras>,
    mut units: Query<&mut Unit>,
    mut charms: ResMut<CharmRegistry>,
    providers: Query<&CharmedPolicyProvider>,
    mut log: ResMut<EncounterLog>,
) {
    for (pending_entity, pending) in pending.iter() {
        commands.entity(pending_entity).despawn();

        let target = pending.target;
        let aura = pending.aura.clone();

        let Ok(target_unit) = units.get(target) else {
            continue;
        };
        if !target_unit.is_alive() {
            continue;
        }
        let target_name = target_unit.name.clone();

        // Re-application refreshes the existing aura of the same spell
        if let Ok(mut auras) = affected.get_mut(target) {
            auras.auras.retain(|a| a.spell != aura.spell);
            auras.auras.push(aura.clone());
        } else {
            commands.entity(target).insert(ActiveAuras {
                auras: vec![aura.clone()],
            });
        }

        match aura.kind {
            AuraKind::Stun => {
                log.log(
                    EncounterLogEventType::Aura,
                    format!("{} is stunned", target_name),
                );
            }
            AuraKind::Charm => {
                let controller = aura.caster;
                charms.add(controller, target);
                commands.entity(target).insert(Charmed { controller });
                if let Ok(provider) = providers.get(controller) {
                    commands
                        .entity(target)
                        .insert(BehaviorPolicy((provider.0)(controller)));
                }

                // The combat-state bookkeeping wedges both sides in combat
                // when a charm lands mid-fight; clear the flags on both.
                // TODO: remove once charm handoff is handled by the
                // combat-state code itself.
                if let Ok(mut controller_unit) = units.get_mut(controller) {
                    controller_unit.in_combat = false;
                }
                if let Ok(mut target_unit) = units.get_mut(target) {
                    target_unit.in_combat = false;
                }

                let controller_name = units
                    .get(controller)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|_| "Unknown".to_string());
                info!("{} seizes control of {}", controller_name, target_name);
                log.log(
                    EncounterLogEventType::Charm,
                    format!("{} seizes control of {}", controller_name, target_name),
                );
            }
        }
    }
}

/// Apply all damage dealt this tick: health, threat, combat flags, deaths.
///
/// Threat accrues on a unit only if it owns a threat list (the adversary);
/// players fighting each other generate none.
pub fn apply_damage_events(
    mut events: EventReader<DamageEvent>,
    mut units: Query<&mut Unit>,
    mut threat_lists: Query<&mut ThreatList>,
    mut kills: EventWriter<UnitKilledEvent>,
    mut log: ResMut<EncounterLog>,
) {
    for event in events.read() {
        let (target_name, died) = {
            let Ok(mut target) = units.get_mut(event.target) else {
                continue;
            };
            if !target.is_alive() {
                continue;
            }
            target.current_health = (target.current_health - event.amount).max(0.0);
            target.damage_taken += event.amount;
            let died = !target.is_alive();
            target.in_combat = !died;
            (target.name.clone(), died)
        };

        let source_name = {
            match units.get_mut(event.source) {
                Ok(mut source) => {
                    source.damage_dealt += event.amount;
                    source.in_combat = true;
                    source.name.clone()
                }
                Err(_) => "Unknown".to_string(),
            }
        };

        if let Ok(mut threat) = threat_lists.get_mut(event.target) {
            threat.add_threat(event.source, event.amount);
        }

        let message = match &event.ability_name {
            Some(ability) => format!(
                "{}'s {} hits {} for {:.0}",
                source_name, ability, target_name, event.amount
            ),
            None => format!("{} hits {} for {:.0}", source_name, target_name, event.amount),
        };
        log.log(EncounterLogEventType::Damage, message);

        if died {
            info!("{} has died", target_name);
            log.log(
                EncounterLogEventType::Death,
                format!("{} dies", target_name),
            );
            for mut threat in threat_lists.iter_mut() {
                threat.remove(event.target);
            }
            kills.send(UnitKilledEvent {
                victim: event.target,
                killer: event.source,
            });
        }
    }
}
