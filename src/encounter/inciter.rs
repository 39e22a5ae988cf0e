//! "The Inciter" Encounter Script
//!
//! A melee brute that periodically turns the party on itself:
//! - **Incite Chaos** (20s, then every 40s): self-cast that charms every
//!   party member on the threat list, via the companion-debuff spell script.
//!   Only cast with more than one unit on the threat list; while the party
//!   fights itself the boss goes passive and does nothing on its own.
//! - **Charge** (5s, then every 15-25s): charge attack on a random
//!   threat-list target.
//! - **War Stomp** (15s, then every 18-24s): area stun, always self-cast.
//!
//! The controller is a three-phase state machine (Idle -> InCombat -> Dead)
//! driven by a cooldown-ordered event scheduler, with a per-tick recovery
//! guard that flips the boss back to Aggressive once no charmed units
//! remain.

use bevy::prelude::*;

use crate::combat::{
    Boss, CharmRegistry, DamageEvent, SimRng, ThreatList, Unit, UnitKilledEvent,
};
use crate::spells::{
    CastRequest, CastTarget, CastingState, SpellDefinitions, SpellHitEvent, SpellId, SpellScript,
};

use super::announcements::{AnnouncementEvent, InciterLine};
use super::charmed::CharmedPolicy;
use super::scheduler::EventScheduler;
use super::EncounterScript;

/// Encounter identifier this script registers under.
pub const INCITER_SCRIPT_NAME: &str = "the-inciter";

const INCITE_CHAOS_INITIAL_DELAY: f32 = 20.0;
const INCITE_CHAOS_INTERVAL: f32 = 40.0;
const CHARGE_INITIAL_DELAY: f32 = 5.0;
const CHARGE_INTERVAL_MIN: f32 = 15.0;
const CHARGE_INTERVAL_MAX: f32 = 25.0;
const WAR_STOMP_INITIAL_DELAY: f32 = 15.0;
const WAR_STOMP_INTERVAL_MIN: f32 = 18.0;
const WAR_STOMP_INTERVAL_MAX: f32 = 24.0;

/// Timed events driving the Inciter's ability rotation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BossEvent {
    InciteChaos,
    ChargeAttack,
    WarStomp,
}

/// Top-level encounter state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EncounterPhase {
    Idle,
    InCombat,
    /// Terminal: no scheduling or casting happens after entry
    Dead,
}

/// Whether the boss currently acts on its own.
/// Passive only for the window opened by an Incite Chaos cast.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReactState {
    Aggressive,
    Passive,
}

/// Controller component for the Inciter encounter.
#[derive(Component)]
pub struct InciterController {
    pub phase: EncounterPhase,
    pub react: ReactState,
    pub events: EventScheduler<BossEvent>,
}

impl InciterController {
    pub fn new() -> Self {
        Self {
            phase: EncounterPhase::Idle,
            react: ReactState::Aggressive,
            events: EventScheduler::new(),
        }
    }
}

impl Default for InciterController {
    fn default() -> Self {
        Self::new()
    }
}

/// The Inciter's entry in the encounter-script registry.
pub fn inciter_script() -> EncounterScript {
    EncounterScript {
        name: INCITER_SCRIPT_NAME,
        boss_name: "The Inciter",
        make_controller: InciterController::new,
        make_charmed_policy: |controller| Box::new(CharmedPolicy::new(controller)),
    }
}

/// Spell script for Incite Chaos: every struck unit immediately receives the
/// companion debuff (which carries the charm) as a triggered cast.
pub struct InciteChaosRelay;

impl SpellScript for InciteChaosRelay {
    fn required_spells(&self) -> Vec<SpellId> {
        vec![SpellId::InciteChaosFrenzy]
    }

    fn on_hit(&self, hit: &SpellHitEvent, casts: &mut Vec<CastRequest>) {
        casts.push(CastRequest {
            caster: hit.caster,
            target: CastTarget::Unit(hit.target),
            spell: SpellId::InciteChaosFrenzy,
            triggered: true,
        });
    }
}

/// Per-tick update for the Inciter controller.
///
/// While in combat the tick resolves in a fixed order:
/// 1. recovery guard (Passive with no charmed units left -> Aggressive)
/// 2. bail out while Passive or without a combat target
/// 3. advance the event scheduler
/// 4. bail out while a cast is in flight
/// 5. drain due events, re-checking Passive/casting after each one
/// 6. melee swing if the timer allows
pub fn update_inciter_ai(
    time: Res<Time>,
    mut rng: ResMut<SimRng>,
    charms: Res<CharmRegistry>,
    spells: Res<SpellDefinitions>,
    casting: Query<(), With<CastingState>>,
    mut bosses: Query<(Entity, &mut InciterController, &mut Unit, &ThreatList), With<Boss>>,
    players: Query<&Unit, Without<Boss>>,
    mut casts: EventWriter<CastRequest>,
    mut damage: EventWriter<DamageEvent>,
    mut announcements: EventWriter<AnnouncementEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut controller, mut unit, threat) in bosses.iter_mut() {
        match controller.phase {
            EncounterPhase::Dead => continue,
            EncounterPhase::Idle => {
                // The combat engine has put someone on the threat list:
                // that is combat entry.
                if threat.is_empty() || !unit.is_alive() {
                    continue;
                }
                enter_combat(entity, &mut controller, &mut announcements);
                continue;
            }
            EncounterPhase::InCombat => {}
        }

        // 1. Recovery guard: Passive is only legitimate while the charm
        //    relation exists. Checked every tick, whatever caused Passive.
        if controller.react == ReactState::Passive && charms.controlled_count(entity) == 0 {
            controller.react = ReactState::Aggressive;
        }

        // 2. Suspended, or no one left to fight: nothing further this tick.
        let victim = current_victim(threat, &players);
        if controller.react == ReactState::Passive || victim.is_none() {
            continue;
        }

        // 3.
        controller.events.advance(dt);

        // 4. An in-flight cast defers event execution and melee.
        if casting.contains(entity) {
            continue;
        }

        // 5. Drain due events. Incite Chaos flipping the boss Passive, or an
        //    event starting a cast, stops both the drain and the melee
        //    fallback for this tick.
        let mut cast_started = false;
        while let Some(event) = controller.events.next_due() {
            match event {
                BossEvent::InciteChaos => {
                    if threat.len() > 1 {
                        // Passive before the cast even resolves; the charm
                        // relation ending is what re-arms the boss.
                        controller.react = ReactState::Passive;
                        casts.send(CastRequest {
                            caster: entity,
                            target: CastTarget::Caster,
                            spell: SpellId::InciteChaos,
                            triggered: false,
                        });
                        cast_started =
                            spells.get_unchecked(SpellId::InciteChaos).cast_time > 0.0;
                    }
                    // Rescheduled on the fixed interval whether or not the
                    // threat check allowed the cast.
                    controller
                        .events
                        .schedule(BossEvent::InciteChaos, INCITE_CHAOS_INTERVAL);
                }
                BossEvent::ChargeAttack => {
                    if let Some(target) = random_alive_target(threat, &players, &mut rng) {
                        casts.send(CastRequest {
                            caster: entity,
                            target: CastTarget::Unit(target),
                            spell: SpellId::Charge,
                            triggered: false,
                        });
                        cast_started = spells.get_unchecked(SpellId::Charge).cast_time > 0.0;
                    }
                    controller.events.schedule(
                        BossEvent::ChargeAttack,
                        rng.random_range(CHARGE_INTERVAL_MIN, CHARGE_INTERVAL_MAX),
                    );
                }
                BossEvent::WarStomp => {
                    casts.send(CastRequest {
                        caster: entity,
                        target: CastTarget::Caster,
                        spell: SpellId::WarStomp,
                        triggered: false,
                    });
                    cast_started = spells.get_unchecked(SpellId::WarStomp).cast_time > 0.0;
                    controller.events.schedule(
                        BossEvent::WarStomp,
                        rng.random_range(WAR_STOMP_INTERVAL_MIN, WAR_STOMP_INTERVAL_MAX),
                    );
                }
            }

            if controller.react == ReactState::Passive || cast_started {
                break;
            }
        }

        // 6. Melee fallback, strictly after the drain.
        if controller.react == ReactState::Passive || cast_started {
            continue;
        }
        if let Some(victim) = victim {
            if unit.melee_ready() {
                let amount = rng.random_range(unit.attack_damage_min, unit.attack_damage_max);
                unit.reset_swing();
                damage.send(DamageEvent {
                    source: entity,
                    target: victim,
                    amount,
                    ability_name: None,
                });
            }
        }
    }
}

fn enter_combat(
    entity: Entity,
    controller: &mut InciterController,
    announcements: &mut EventWriter<AnnouncementEvent>,
) {
    controller.phase = EncounterPhase::InCombat;
    controller.react = ReactState::Aggressive;
    controller
        .events
        .schedule(BossEvent::InciteChaos, INCITE_CHAOS_INITIAL_DELAY);
    controller
        .events
        .schedule(BossEvent::ChargeAttack, CHARGE_INITIAL_DELAY);
    controller
        .events
        .schedule(BossEvent::WarStomp, WAR_STOMP_INITIAL_DELAY);
    announcements.send(AnnouncementEvent {
        speaker: entity,
        line: InciterLine::Aggro,
    });
}

/// Highest-standing alive unit on the threat list, if any.
fn current_victim(threat: &ThreatList, players: &Query<&Unit, Without<Boss>>) -> Option<Entity> {
    threat
        .units()
        .find(|&unit| players.get(unit).map(|u| u.is_alive()).unwrap_or(false))
}

/// Uniformly random alive unit from the threat list.
fn random_alive_target(
    threat: &ThreatList,
    players: &Query<&Unit, Without<Boss>>,
    rng: &mut SimRng,
) -> Option<Entity> {
    let candidates: Vec<Entity> = threat
        .units()
        .filter(|&unit| players.get(unit).map(|u| u.is_alive()).unwrap_or(false))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_index(candidates.len())])
}

/// React to deaths: the boss slaying a player yells the slay line; the boss
/// dying ends the encounter.
///
/// Death is terminal: every pending scheduled event is discarded, the threat
/// list is dropped, and combat flags clear. The death line plays exactly
/// once, on the killing blow.
pub fn handle_kill_events(
    mut kills: EventReader<UnitKilledEvent>,
    mut bosses: Query<(Entity, &mut InciterController, &mut Unit, &mut ThreatList), With<Boss>>,
    mut players: Query<&mut Unit, Without<Boss>>,
    mut announcements: EventWriter<AnnouncementEvent>,
) {
    for kill in kills.read() {
        // The boss itself died
        if let Ok((entity, mut controller, mut unit, mut threat)) = bosses.get_mut(kill.victim) {
            if controller.phase == EncounterPhase::Dead {
                continue;
            }
            controller.phase = EncounterPhase::Dead;
            controller.events.clear();
            threat.clear();
            unit.in_combat = false;
            for mut player in players.iter_mut() {
                player.in_combat = false;
            }
            announcements.send(AnnouncementEvent {
                speaker: entity,
                line: InciterLine::Death,
            });
            continue;
        }

        // The boss slew a player
        if let Ok((entity, controller, _, _)) = bosses.get_mut(kill.killer) {
            if controller.phase == EncounterPhase::Dead {
                continue;
            }
            let victim_is_player = players
                .get(kill.victim)
                .map(|u| u.is_player)
                .unwrap_or(false);
            if victim_is_player {
                announcements.send(AnnouncementEvent {
                    speaker: entity,
                    line: InciterLine::Slay,
                });
            }
        }
    }
}
