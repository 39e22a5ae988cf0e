//! Encounter logging
//!
//! Records all encounter events for display and post-run analysis.

use serde::Serialize;

use bevy::prelude::*;

/// A single entry in the encounter log
#[derive(Debug, Clone, Serialize)]
pub struct EncounterLogEntry {
    /// Timestamp in encounter time (seconds since simulation start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: EncounterLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of encounter log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncounterLogEventType {
    /// Damage dealt
    Damage,
    /// Spell cast started or resolved
    SpellCast,
    /// Status effect applied or removed
    Aura,
    /// A unit was taken over or released
    Charm,
    /// Scripted yell line
    Announcement,
    /// Unit died
    Death,
    /// Encounter event (start, end, etc.)
    EncounterEvent,
}

/// The encounter log resource storing all events
#[derive(Resource, Default)]
pub struct EncounterLog {
    /// All log entries in chronological order
    pub entries: Vec<EncounterLogEntry>,
    /// Current encounter time
    pub encounter_time: f32,
}

impl EncounterLog {
    /// Clear the log for a new encounter
    pub fn clear(&mut self) {
        self.entries.clear();
        self.encounter_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: EncounterLogEventType, message: String) {
        self.entries.push(EncounterLogEntry {
            timestamp: self.encounter_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: EncounterLogEventType) -> Vec<&EncounterLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Save the log (with encounter metadata) to a JSON file.
    /// Returns the path written to.
    pub fn save_to_file(
        &self,
        metadata: &EncounterMetadata,
        output_path: &str,
    ) -> Result<String, String> {
        let export = EncounterLogExport {
            metadata,
            entries: &self.entries,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| format!("Failed to serialize encounter log: {}", e))?;

        std::fs::write(output_path, json)
            .map_err(|e| format!("Failed to write {}: {}", output_path, e))?;

        Ok(output_path.to_string())
    }
}

/// Metadata about a completed encounter, saved alongside the log.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterMetadata {
    pub encounter: String,
    pub boss_defeated: bool,
    pub duration: f32,
    pub party: Vec<PartyMemberMetadata>,
}

/// Final stats for a single party member.
#[derive(Debug, Clone, Serialize)]
pub struct PartyMemberMetadata {
    pub name: String,
    pub max_health: f32,
    pub final_health: f32,
    pub survived: bool,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

#[derive(Serialize)]
struct EncounterLogExport<'a> {
    metadata: &'a EncounterMetadata,
    entries: &'a [EncounterLogEntry],
}
