//! Scripted Announcement Lines
//!
//! The dialogue collaborator: indexed yell lines per encounter script.
//! Controllers trigger playback by index; playback writes to the encounter
//! log and the tracing output.

use bevy::prelude::*;
use tracing::info;

use crate::combat::{EncounterLog, EncounterLogEventType, Unit};

/// Indexed yell lines for the Inciter script. Indices line up with the
/// dialogue table so a localization pass can swap the text wholesale.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InciterLine {
    Intro = 0,
    Aggro = 1,
    Slay = 2,
    Help = 3,
    Death = 4,
}

const INCITER_LINES: [&str; 5] = [
    "Trespassers! Come closer... come die!",
    "Rip them! Tear them! Turn them on each other!",
    "Down you go. Stay down!",
    "To me! The intruders bleed!",
    "No... the voices... quiet now...",
];

/// Look up the text for a line index.
pub fn line_text(line: InciterLine) -> &'static str {
    INCITER_LINES[line as usize]
}

/// Event requesting playback of an announcement line.
#[derive(Event, Clone, Copy, Debug)]
pub struct AnnouncementEvent {
    pub speaker: Entity,
    pub line: InciterLine,
}

/// Play queued announcements into the encounter log.
pub fn play_announcements(
    mut events: EventReader<AnnouncementEvent>,
    units: Query<&Unit>,
    mut log: ResMut<EncounterLog>,
) {
    for event in events.read() {
        let speaker = units
            .get(event.speaker)
            .map(|u| u.name.as_str())
            .unwrap_or("Unknown");
        let message = format!("{} yells: {}", speaker, line_text(event.line));
        info!("{}", message);
        log.log(EncounterLogEventType::Announcement, message);
    }
}
