//! placematch - Demo Entry Point
//!
//! Builds a fixed sample roster (five candidates, three two-slot
//! providers), runs the deferred-acceptance engine, and renders the
//! terminal placements. Set RUST_LOG=placematch=debug to watch the
//! engine's proposal/discount/eviction events.

use placematch::{Participant, PlacementStatus, RosterBuilder};
use tracing_subscriber::EnvFilter;

/// Render a name in strikethrough font (combining long stroke overlay).
/// Used to display candidates who ended the run unplaced.
fn strikethrough(name: &str) -> String {
    let mut out = String::with_capacity(name.len() * 3);
    for c in name.chars() {
        out.push(c);
        out.push('\u{0336}');
    }
    out
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("===========================================");
    println!("  placematch - deferred acceptance demo");
    println!("===========================================");
    println!();

    let mut engine = RosterBuilder::new()
        .candidate("Arthur", &["City"])
        .candidate("Sunny", &["City", "Mercy"])
        .candidate("Joseph", &["City", "General", "Mercy"])
        .candidate("Latha", &["Mercy", "City", "General"])
        .candidate("Darius", &["City", "Mercy", "General"])
        .provider("Mercy", 2, &["Darius", "Joseph"])
        .provider("City", 2, &["Darius", "Arthur", "Sunny", "Latha", "Joseph"])
        .provider("General", 2, &["Darius", "Arthur", "Joseph", "Latha"])
        .build()
        .expect("sample roster is well-formed");

    println!(
        "Roster: {} candidates, {} providers",
        engine.candidate_count(),
        engine.provider_count()
    );
    println!();
    println!("Running engine...");
    let receipt = match engine.run() {
        Ok(receipt) => receipt,
        Err(e) => {
            eprintln!("ERROR: matching failed: {e}");
            std::process::exit(1);
        }
    };

    println!();
    println!("Placements by provider:");
    for (_, provider) in engine.providers() {
        println!("  {} (capacity {}):", provider.name(), provider.capacity());
        for (&candidate_key, &status) in provider.placements() {
            let candidate = engine
                .candidate(candidate_key)
                .map(|c| c.name())
                .unwrap_or("?");
            let tag = match status {
                PlacementStatus::Tentative => "tentative",
                PlacementStatus::Final => "final",
            };
            println!("    {candidate:<10} [{tag}]");
        }
        if provider.placements().is_empty() {
            println!("    (empty)");
        }
    }

    println!();
    println!("Candidates:");
    for (_, candidate) in engine.candidates() {
        match candidate.placement().and_then(|key| engine.provider(key)) {
            Some(provider) => println!("  {:<10} -> {}", candidate.name(), provider.name()),
            None => println!("  {:<10} -> unplaced", strikethrough(candidate.name())),
        }
    }

    println!();
    println!("=== RUN RECEIPT ===");
    println!("  Candidates processed: {:>6}", receipt.candidates_processed);
    println!("  Proposals considered: {:>6}", receipt.proposals_considered);
    println!("  Evictions:            {:>6}", receipt.evictions);
    println!("  Placed:               {:>6}", receipt.placed);
    println!("  Unplaced:             {:>6}", receipt.unplaced);
    if let Some(rate) = receipt.placement_rate() {
        println!("  Placement rate:       {:>6.0}%", rate * 100.0);
    }
    println!("  State root: {}", receipt.state_root_hex());
}
