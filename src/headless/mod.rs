//! Headless encounter execution
//!
//! Runs scripted encounters without graphics or a host server, suitable for
//! automated testing and batch analysis.
//!
//! ## Usage
//! ```ignore
//! use encountersim::headless::{HeadlessEncounterConfig, run_headless_encounter};
//!
//! let config = HeadlessEncounterConfig::with_party(vec![
//!     "Aldric".to_string(),
//!     "Brenna".to_string(),
//!     "Corvin".to_string(),
//! ]);
//! let result = run_headless_encounter(config)?;
//! println!("boss defeated: {}", result.boss_defeated);
//! ```

pub mod config;
pub mod runner;

pub use config::HeadlessEncounterConfig;
pub use runner::{
    advance_sim, build_encounter_app, run_headless_encounter, EncounterResult, PartyMemberResult,
    SIM_TICK,
};
