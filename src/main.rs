//! EncounterSim - Scripted Boss Encounter Simulator Prototype
//!
//! Runs one headless encounter and prints the outcome.

use encountersim::cli;
use encountersim::headless::{run_headless_encounter, HeadlessEncounterConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let args = cli::parse_args();

    let mut config = match &args.config {
        Some(path) => match HeadlessEncounterConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => HeadlessEncounterConfig::with_party(vec![
            "Aldric".to_string(),
            "Brenna".to_string(),
            "Corvin".to_string(),
        ]),
    };

    // CLI flags override the config file
    if let Some(output) = &args.output {
        config.output_path = Some(output.display().to_string());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }

    match run_headless_encounter(config) {
        Ok(result) => {
            let outcome = if result.boss_defeated {
                "boss defeated"
            } else if result.party_wiped {
                "party wiped"
            } else {
                "timed out"
            };
            println!(
                "Encounter ended after {:.1}s: {}",
                result.encounter_time, outcome
            );
            for member in &result.party {
                println!(
                    "  {} - {} ({:.0} hp left, {:.0} dealt, {:.0} taken)",
                    member.name,
                    if member.survived { "alive" } else { "dead" },
                    member.final_health,
                    member.damage_dealt,
                    member.damage_taken,
                );
            }
        }
        Err(e) => {
            eprintln!("Encounter failed: {}", e);
            std::process::exit(1);
        }
    }
}
