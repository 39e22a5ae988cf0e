//! EncounterSim - Scripted Boss Encounter Simulator Prototype
//!
//! A prototype implementation of a server-side scripted boss encounter:
//! a timed-event combat scheduler, a reactive-state gate, and a substitute
//! targeting policy for players taken over by the adversary's control
//! ability, layered on a minimal combat engine.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod encounter;
pub mod headless;
pub mod spells;

// Re-export commonly used types
pub use combat::log::{EncounterLog, EncounterLogEventType};
pub use encounter::{EventScheduler, InciterController};
pub use headless::HeadlessEncounterConfig;
pub use spells::SpellId;
