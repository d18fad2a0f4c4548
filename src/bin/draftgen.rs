//! Generate message declarations and stream operators from a protocol draft.
//!
//! Usage:
//!   draftgen [OPTIONS] <SPEC> <OUTPUT_BASE>
//!
//! Writes `<OUTPUT_BASE>.h` and `<OUTPUT_BASE>.cpp`. Nothing is written when the draft
//! yields no messages. Unresolved types are embedded as `#error` lines unless `--strict`.
//!
//! Options:
//!   --config, -c FILE   TOML configuration (type table overrides, discards, C++ options)
//!   --strict            Fail without writing on unresolved types or duplicate wire ids
//!   --dump              Print the parsed model instead of writing artifacts
//!   --check             Print model findings instead of writing artifacts (exit 1 on errors)
//!   --verbose, -v       Debug logging (RUST_LOG overrides)

use anyhow::Context;
use clap::Parser;
use draftgen::{check, dump, Config, CppBackend, UnresolvedPolicy};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "draftgen")]
#[command(about = "Generate message declarations and definitions from a protocol draft", long_about = None)]
#[command(version)]
struct Cli {
    /// Draft text containing `Name Message { ... }` blocks
    spec: PathBuf,

    /// Output path without extension
    output_base: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail without writing when a type is unresolved or wire type ids collide
    #[arg(long)]
    strict: bool,

    /// Print the parsed model to stdout instead of writing artifacts
    #[arg(long)]
    dump: bool,

    /// Print model check findings instead of writing artifacts
    #[arg(long)]
    check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.strict {
        config.unresolved = UnresolvedPolicy::Fail;
    }
    let backend = CppBackend::new(config.cpp.clone());

    if cli.dump || cli.check {
        let text = std::fs::read_to_string(&cli.spec)
            .with_context(|| format!("reading {}", cli.spec.display()))?;
        let generation = draftgen::generate(&text, &config, &backend, "")?;
        if cli.dump {
            print!("{}", dump::model_to_dump(&generation.outcome.messages));
        }
        if cli.check {
            for finding in &generation.findings {
                println!("{}: {}", cli.spec.display(), finding);
            }
            if check::has_errors(&generation.findings) {
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let report = draftgen::run(&cli.spec, &cli.output_base, &config, &backend)
        .with_context(|| format!("generating from {}", cli.spec.display()))?;
    if report.written.is_empty() {
        eprintln!("Protocol parser returned no messages; nothing written.");
    }
    Ok(())
}
