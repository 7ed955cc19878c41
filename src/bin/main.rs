// src/bin/main.rs
// Offline DIRT builder: annotated biographies in, verb equivalence model out.
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dirt_core::config::{load_config, DirtConfig};
use dirt_core::core::extractor::clean_text;
use dirt_core::persistence::{load_contexts, save_contexts, save_model};
use dirt_core::{ConlluOracle, ModelBuilder};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dirt_build", about = "Discovery of Inference Rules from Text: verb equivalence builder")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean raw biography files into one document per line, ready for the parser
    Clean {
        inputs: Vec<PathBuf>,
    },
    /// Build the equivalence model from a CoNLL-U corpus
    Build {
        #[arg(long)]
        corpus: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        threshold: Option<f64>,
        /// Where to write (or read, with --rescore) the verb context snapshot
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Skip annotation and rescore an existing snapshot
        #[arg(long, requires = "snapshot")]
        rescore: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dirt_core=info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DirtConfig::default(),
    };

    match cli.command {
        Command::Clean { inputs } => clean(&inputs),
        Command::Build { corpus, output, threshold, snapshot, rescore } => {
            if corpus.is_some() {
                config.build.corpus = corpus;
            }
            if let Some(output) = output {
                config.build.model_path = output;
            }
            if let Some(threshold) = threshold {
                config.build.threshold = threshold;
            }
            if snapshot.is_some() {
                config.build.contexts_snapshot = snapshot;
            }
            config.validate()?;
            build(&config, rescore)
        }
    }
}

fn clean(inputs: &[PathBuf]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for path in inputs {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let cleaned = clean_text(&raw);
        if cleaned.is_empty() {
            continue;
        }
        writeln!(out, "{cleaned}")?;
    }
    Ok(())
}

fn build(config: &DirtConfig, rescore: bool) -> Result<()> {
    info!("DIRT Builder - Discovery of Inference Rules from Text");
    let builder = ModelBuilder::from_config(&config.build);

    let model = if rescore {
        let Some(snapshot) = &config.build.contexts_snapshot else {
            bail!("--rescore needs a context snapshot path");
        };
        let contexts = load_contexts(snapshot)
            .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?;
        info!(verbs = contexts.len(), triples = contexts.triple_count(), "Rescoring snapshot");
        builder.build_from_contexts(&contexts).inspect_err(|e| error!("Aborting: {e}"))?
    } else {
        let Some(corpus) = &config.build.corpus else {
            bail!("No corpus configured; pass --corpus or set build.corpus");
        };
        let oracle = ConlluOracle::from_path(corpus)
            .with_context(|| format!("Cannot initialise the oracle from {}", corpus.display()))?;
        let texts: Vec<String> = oracle.documents().map(str::to_string).collect();
        info!(documents = texts.len(), sentences = oracle.sentence_count(), "Corpus loaded");

        let outcome = builder.build(&texts, &oracle).inspect_err(|e| error!("Aborting: {e}"))?;
        if let Some(snapshot) = &config.build.contexts_snapshot {
            save_contexts(&outcome.contexts, snapshot)?;
        }
        outcome.model
    };

    save_model(&model, &config.build.model_path)?;
    info!(
        path = %config.build.model_path.display(),
        equivalences = model.equivalence_count,
        "Process completed successfully"
    );
    Ok(())
}
