//! Substitute Targeting Policy for Charmed Party Members
//!
//! Installed on a player for the lifetime of the Inciter's charm; replaces
//! their normal target selection with "fight the other controlled units".
//! The policy holds only the controller's entity id and re-checks the live
//! charm relation on every call.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::{SimRng, TargetContext, TargetPolicy};

/// Targeting policy for a unit under the Inciter's control.
pub struct CharmedPolicy {
    controller: Entity,
}

impl CharmedPolicy {
    pub fn new(controller: Entity) -> Self {
        Self { controller }
    }
}

impl TargetPolicy for CharmedPolicy {
    /// Pick one of the *other* units controlled by the same controller,
    /// uniformly at random. Abstains when the controller no longer exists
    /// or fewer than two units are under its control.
    fn select_attack_target(&self, ctx: &TargetContext, rng: &mut SimRng) -> Option<Entity> {
        if !ctx.alive.contains(&self.controller) {
            return None;
        }

        let controlled = ctx.charms.controlled_by(self.controller);
        if controlled.len() <= 1 {
            return None;
        }

        let others: SmallVec<[Entity; 8]> = controlled
            .iter()
            .copied()
            .filter(|&unit| unit != ctx.self_entity)
            .collect();
        if others.is_empty() {
            return None;
        }
        Some(others[rng.random_index(others.len())])
    }
}
