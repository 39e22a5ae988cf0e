//! Per-Spell Script Hooks
//!
//! A spell script reacts to a spell's hits with extra behavior the data-driven
//! effect cannot express (e.g., chaining a triggered cast onto each struck
//! target). Scripts are registered against a spell id at load time; any spell
//! id a script requires must resolve in the definitions or registration is
//! rejected outright.

use std::collections::HashMap;

use bevy::prelude::*;

use super::config::{SpellDefinitions, SpellId};
use super::{CastRequest, SpellHitEvent};

/// Script hook attached to a spell.
pub trait SpellScript: Send + Sync + 'static {
    /// Spell ids this script casts or otherwise depends on.
    /// Validated against the registry when the script is registered.
    fn required_spells(&self) -> Vec<SpellId> {
        Vec::new()
    }

    /// Called once per unit the spell strikes. Casts pushed into `casts`
    /// are processed immediately; triggered requests resolve silently
    /// without touching the caster's in-flight cast.
    fn on_hit(&self, hit: &SpellHitEvent, casts: &mut Vec<CastRequest>);
}

/// Registry of spell scripts, keyed by the spell they hook.
#[derive(Resource, Default)]
pub struct SpellScripts {
    scripts: HashMap<SpellId, Box<dyn SpellScript>>,
}

impl SpellScripts {
    /// Register a script for a spell.
    ///
    /// Fails if any spell id the script requires does not resolve in the
    /// definitions; the caller is expected to abort the whole script load.
    pub fn register(
        &mut self,
        spell: SpellId,
        script: Box<dyn SpellScript>,
        definitions: &SpellDefinitions,
    ) -> Result<(), String> {
        for required in script.required_spells() {
            if !definitions.contains(required) {
                return Err(format!(
                    "spell script for {:?} requires {:?}, which is not defined",
                    spell, required
                ));
            }
        }
        self.scripts.insert(spell, script);
        Ok(())
    }

    pub fn get(&self, spell: SpellId) -> Option<&dyn SpellScript> {
        self.scripts.get(&spell).map(|script| &**script)
    }
}
