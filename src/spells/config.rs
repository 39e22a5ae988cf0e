//! Data-Driven Spell Configuration
//!
//! Spell definitions are loaded from `assets/config/spells.ron` instead of
//! being hardcoded. All spells an encounter uses must resolve at startup;
//! a config with a missing definition is rejected before anything runs.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Enum identifying the spells used by this encounter.
///
/// A closed, typed set rather than raw numeric ids, so the load-time
/// validation contract is enforceable by the type system.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SpellId {
    /// Chaos-inducing self-cast; its spell script charms every struck unit
    InciteChaos,
    /// Companion debuff applied per struck party member; carries the charm
    InciteChaosFrenzy,
    /// Charge attack against a random threat-list target
    Charge,
    /// Area stun, always cast on self
    WarStomp,
}

/// How a spell's hits are resolved.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SpellTargeting {
    /// Strikes the caster only
    SelfCast,
    /// Strikes the unit the cast was aimed at
    SingleUnit,
    /// Strikes every unit on the caster's threat list
    ThreatList,
}

/// The mechanical effect applied to each unit a spell strikes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SpellEffect {
    Damage { base_min: f32, base_max: f32 },
    Stun { duration: f32 },
    Charm { duration: f32 },
    /// No direct effect; a registered spell script reacts to each hit
    ScriptEffect,
}

/// Complete spell configuration loaded from RON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpellConfig {
    /// Display name of the spell
    pub name: String,
    /// Cast time in seconds (0.0 = instant)
    #[serde(default)]
    pub cast_time: f32,
    pub targeting: SpellTargeting,
    pub effect: SpellEffect,
}

/// Root structure for the spells.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct SpellsConfig {
    pub spells: HashMap<SpellId, SpellConfig>,
}

/// Resource containing all spell definitions.
///
/// Loaded from `assets/config/spells.ron` at startup.
/// Access via `Res<SpellDefinitions>` in systems.
#[derive(Resource)]
pub struct SpellDefinitions {
    definitions: HashMap<SpellId, SpellConfig>,
}

impl Default for SpellDefinitions {
    /// Load spell definitions from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_spell_definitions().expect("Failed to load spell definitions in Default impl")
    }
}

impl SpellDefinitions {
    /// Create from a loaded config
    pub fn new(config: SpellsConfig) -> Self {
        Self {
            definitions: config.spells,
        }
    }

    /// Get the configuration for a spell
    pub fn get(&self, spell: SpellId) -> Option<&SpellConfig> {
        self.definitions.get(&spell)
    }

    /// Get the configuration for a spell, panicking if not found.
    /// Use this when the spell must exist (validated at startup).
    pub fn get_unchecked(&self, spell: SpellId) -> &SpellConfig {
        self.definitions
            .get(&spell)
            .unwrap_or_else(|| panic!("Spell {:?} not found in definitions", spell))
    }

    /// Whether a spell id resolves to a definition.
    pub fn contains(&self, spell: SpellId) -> bool {
        self.definitions.contains_key(&spell)
    }

    /// Check that every expected spell is defined
    pub fn validate(&self) -> Result<(), Vec<SpellId>> {
        let expected = [
            SpellId::InciteChaos,
            SpellId::InciteChaosFrenzy,
            SpellId::Charge,
            SpellId::WarStomp,
        ];

        let missing: Vec<SpellId> = expected
            .into_iter()
            .filter(|spell| !self.definitions.contains_key(spell))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

/// Load spell definitions from assets/config/spells.ron
pub fn load_spell_definitions() -> Result<SpellDefinitions, String> {
    let config_path = "assets/config/spells.ron";

    let contents = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path, e))?;

    let config: SpellsConfig =
        ron::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", config_path, e))?;

    let definitions = SpellDefinitions::new(config);

    definitions
        .validate()
        .map_err(|missing| format!("Missing spell definitions: {:?}", missing))?;

    info!(
        "Loaded {} spell definitions from {}",
        definitions.definitions.len(),
        config_path
    );

    Ok(definitions)
}

/// Bevy plugin for spell configuration loading
pub struct SpellConfigPlugin;

impl Plugin for SpellConfigPlugin {
    fn build(&self, app: &mut App) {
        // A bad config is a load-time failure, never a silent skip
        match load_spell_definitions() {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                panic!("Failed to load spell definitions: {}", e);
            }
        }
    }
}
