//! `license-ripper` — resolve the licenses of a project's npm dependencies from their license texts.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load options ([`config::load_config`]) and layer CLI flags on top.
//! 3. Discover installed packages ([`discover`]).
//! 4. Resolve each package's license texts and expression ([`resolver`]),
//!    falling back to the upstream repository ([`source`], [`cache`]).
//! 5. Deduplicate versions and append manual entries ([`aggregate`]).
//! 6. Render the requested report ([`report`]) and print warnings.
//! 7. Exit `0` (clean) or `1` (an invalid license or a missing license text).

mod aggregate;
mod cache;
mod cli;
mod config;
mod discover;
mod error;
mod license;
mod models;
mod report;
mod resolver;
mod source;
mod version;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let mut options = load_config(&path, cli.config.as_deref())?;
    cli.apply_to(&mut options);

    if cli.clean {
        aggregate::project_cache(&path, &options).clear().await?;
        return Ok(());
    }

    let client = source::http_client()?;

    let pb = if !cli.quiet {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut output = aggregate::rip_all(&path, &options, client, pb.as_ref()).await;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    output.resolved.sort_by(|a, b| a.name.cmp(&b.name));

    let target = cli.output.as_deref();
    match cli.report {
        ReportFormat::Json => report::json::write(&output.resolved, target)?,
        ReportFormat::Compress => report::json::write(&report::json::compress(&output.resolved), target)?,
        ReportFormat::Summary => report::json::write(&report::json::summary(&output.resolved), target)?,
        ReportFormat::Table => report::terminal::render(&output.resolved),
    }

    if report::warnings::print(&output) {
        std::process::exit(1);
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "warn,license_ripper=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
