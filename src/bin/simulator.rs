// src/bin/simulator.rs
// Rewrites candidate hint sentences read from stdin, one per line.
// Run with: cargo run --bin dirt_apply -- --annotations hints.conllu < hints.txt
use anyhow::Result;
use clap::Parser;
use crossterm::style::Stylize;
use dirt_core::config::{load_config, DirtConfig};
use dirt_core::{ConlluOracle, DirtEngine, LinguisticOracle};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dirt_apply", about = "Paraphrase hint sentences with learned verb equivalences")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    /// CoNLL-U annotations covering the input sentences
    #[arg(long)]
    annotations: Option<PathBuf>,
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long)]
    probability: Option<f64>,
    #[arg(long)]
    min_score: Option<f64>,
    #[arg(long)]
    max_substitutions: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dirt_core=warn".parse()?))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => DirtConfig::default(),
    };
    let apply = &mut config.apply;
    if let Some(model) = args.model {
        apply.model_path = model;
    }
    if let Some(p) = args.probability {
        apply.substitution_probability = p;
    }
    if let Some(s) = args.min_score {
        apply.min_score = s;
    }
    if args.max_substitutions.is_some() {
        apply.max_substitutions = args.max_substitutions;
    }
    if args.seed.is_some() {
        apply.seed = args.seed;
    }
    config.validate()?;

    // A missing or broken annotation file degrades to passthrough.
    let oracle = args.annotations.as_deref().and_then(|path| match ConlluOracle::from_path(path) {
        Ok(oracle) => Some(oracle),
        Err(e) => {
            warn!(error = %e, "Linguistic oracle unavailable, sentences will pass through");
            None
        }
    });

    let engine = DirtEngine::from_cache(&config.apply.model_path);
    if engine.model().is_none() {
        eprintln!("No DIRT model available. Run 'dirt_build build' to generate one.");
    }

    let sentences: Vec<String> = io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let mut rng: Box<dyn RngCore> = match config.apply.seed {
        Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };
    let report = engine.apply_with_report(
        &sentences,
        &config.apply.options(),
        oracle.as_ref().map(|o| o as &dyn LinguisticOracle),
        &mut *rng,
    );

    for (i, (original, rewritten)) in sentences.iter().zip(&report.sentences).enumerate() {
        if original != rewritten {
            println!("{} {}. {}", "✓".green(), i + 1, rewritten.as_str().bold());
        } else {
            println!("  {}. {}", i + 1, rewritten);
        }
    }
    eprintln!(
        "\nSentences modified: {}/{}",
        report.substitutions.len(),
        sentences.len()
    );
    for s in &report.substitutions {
        eprintln!(
            "  #{}: {} -> {} (score: {:.3})",
            s.sentence + 1,
            s.original.as_str().dark_grey(),
            s.replacement.as_str().cyan(),
            s.score
        );
    }
    Ok(())
}
