// Model inspection harness
// Run with: cargo run --bin dirt_inspect -- fundar recibir estudiar
// src/bin/inspect.rs
use clap::Parser;
use dirt_core::config::DEFAULT_MODEL_PATH;
use dirt_core::persistence::load_model;
use dirt_core::EquivalenceIndex;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dirt_inspect", about = "Show DIRT model statistics and verb equivalents")]
struct Args {
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
    #[arg(long, default_value_t = 5)]
    top: usize,
    /// Verbs (lemmas) to list equivalents for
    verbs: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dirt_core=warn")))
        .init();

    let args = Args::parse();
    let Some(model) = load_model(&args.model) else {
        println!("No DIRT model available at '{}'", args.model.display());
        println!("  Run 'dirt_build build' to generate one.");
        return ExitCode::FAILURE;
    };

    let stats = model.stats();
    println!("DIRT model statistics:");
    println!("  Version:          {}", stats.version);
    match stats.generated_at {
        Some(at) => println!("  Generated:        {}", at.to_rfc3339()),
        None => println!("  Generated:        N/A"),
    }
    println!("  Equivalences:     {}", stats.equivalence_count);
    println!("  Unique verbs:     {}", stats.unique_verbs);
    println!("  Mean score:       {:.3}", stats.mean_score);
    println!("  Max score:        {:.3}", stats.max_score);
    println!("  Min score:        {:.3}", stats.min_score);

    let index = EquivalenceIndex::from_model(&model);
    for verb in &args.verbs {
        println!("\nEquivalents for '{}':", verb);
        let equivalents = index.top_n(verb, args.top);
        if equivalents.is_empty() {
            println!("  - none found");
        }
        for (i, (other, score)) in equivalents.iter().enumerate() {
            println!("  {}. {:15} (score: {:.3})", i + 1, other, score);
        }
    }
    ExitCode::SUCCESS
}
