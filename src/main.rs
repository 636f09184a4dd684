//! findex - Local Filesystem Fuzzy Finder
//!
//! Entry point for the CLI application.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use findex::config::{CliArgs, Config};
use findex::progress::ProgressReporter;
use findex::{CatalogError, FindexError, Indexer, LocationOptions};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = Config::load().context("Invalid configuration")?;
    let indexer = build_indexer(&config)?;

    let result = match args.term {
        None => status_or_reindex(&indexer),
        Some(ref term) => search(&indexer, term, args.num),
    };

    // reclaim superseded generations on the way out
    if let Err(e) = indexer.close() {
        error!("failed to close index: {e}");
    }

    result
}

/// Report index status and offer to rebuild it
fn status_or_reindex(indexer: &Indexer) -> Result<()> {
    match indexer.open() {
        Ok(()) => {
            let last = indexer.last_indexed().context("Failed to read index age")?;
            println!("Index was last indexed at {}", last.format("%Y-%m-%d %H:%M"));
            if confirm("Do you want to reindex it now")? {
                reindex(indexer)?;
            }
            Ok(())
        }
        Err(e) => index_if_not_exists(indexer, e),
    }
}

/// Offer to create the index when HEAD is missing; other errors surface
fn index_if_not_exists(indexer: &Indexer, err: FindexError) -> Result<()> {
    if !matches!(err, FindexError::Catalog(CatalogError::HeadDoesNotExist)) {
        return Err(err.into());
    }
    println!("Index is not created yet");
    if confirm("Do you want to create it now")? {
        reindex(indexer)?;
    }
    Ok(())
}

/// Build a fresh generation, publish it and report the document count
fn reindex(indexer: &Indexer) -> Result<()> {
    let progress = ProgressReporter::new();
    progress.set_status("Indexing...");

    let result = indexer
        .index()
        .and_then(|name| indexer.open_and_swap(&name));
    progress.finish_and_clear();
    result.context("Reindex failed")?;

    let count = indexer.doc_count()?;
    println!("Indexed {count} files");
    Ok(())
}

/// Search the published index and print the top hits
fn search(indexer: &Indexer, term: &str, num: usize) -> Result<()> {
    if term.is_empty() {
        bail!("search term cannot be blank");
    }

    if let Err(e) = indexer.open() {
        index_if_not_exists(indexer, e)?;
        // searching still requires an index; bail out quietly if the
        // user declined to create one
        if indexer.index_name().is_err() {
            return Ok(());
        }
    }

    let results = indexer.search(term).context("Search failed")?;
    for hit in results.hits.iter().take(num) {
        println!("{}", hit.id);
    }
    Ok(())
}

fn build_indexer(config: &Config) -> Result<Indexer> {
    let mut builder = Indexer::builder(&config.base_path);
    for location in &config.locations {
        builder = builder.location(
            &location.path,
            LocationOptions {
                filters: location.filters.clone(),
                ignores: location.ignores.clone(),
            },
        );
    }
    builder.build().context("Invalid indexer setup")
}

/// Simple yes/no prompt; defaults to no
fn confirm(message: &str) -> Result<bool> {
    print!("{message}? [y/N] ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("findex=info,warn")
    } else {
        EnvFilter::new("findex=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    Ok(())
}
