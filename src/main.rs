use anyhow::{Context, Result};
use clap::Parser;
use propdoc_core::project::{expand_paths, extract_files};
use propdoc_core::{Extractor, OptionsFile, SchemaCache, SwcPropParser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Extract component prop documentation from TypeScript sources", long_about = None)]
struct Cli {
    /// Source files or directories to extract
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Exports whose display name matches this become the `default` entry
    #[arg(long)]
    component_name: Option<String>,

    /// Drop props whose name matches this regex (repeatable)
    #[arg(long = "exclude", value_name = "REGEX")]
    excludes: Vec<String>,

    /// Drop props declared only under node_modules
    #[arg(long)]
    ignore_node_modules: bool,

    /// Drop props without a description
    #[arg(long)]
    skip_undocumented: bool,

    /// JSON options file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log cache and parse activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("PROPDOC_LOG").unwrap_or_else(|_| "warn".to_string())
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn load_options(cli: &Cli) -> Result<OptionsFile> {
    let mut file = match &cli.config {
        Some(path) => OptionsFile::load(path)?,
        None => OptionsFile::default(),
    };
    if cli.component_name.is_some() {
        file.component_name = cli.component_name.clone();
    }
    file.excludes.extend(cli.excludes.iter().cloned());
    file.ignore_node_modules |= cli.ignore_node_modules;
    file.skip_props_without_doc |= cli.skip_undocumented;
    Ok(file)
}

fn run(cli: Cli) -> Result<bool> {
    let options = load_options(&cli)?.into_options()?;
    let files = expand_paths(&cli.paths);

    let extractor = Extractor::new(SwcPropParser, Arc::new(SchemaCache::new()));
    let report = extract_files(&extractor, &files, &options);
    for (file, err) in &report.failures {
        warn!(file = %file.display(), "{err}");
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize schemas")?;
    println!("{}", json);
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("propdoc: {err:#}");
            ExitCode::from(2)
        }
    }
}
