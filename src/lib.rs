//! Terracat: builder, validator and reader for spatio-temporal asset
//! catalogs.
//!
//! Terracat assembles a catalog of raster and vector geospatial sources
//! (catalog -> collections -> items -> assets, as linked JSON documents),
//! enforces its structural invariants, and reads published catalogs back
//! lazily. Build, validate and publish are library calls; the CLI only
//! wraps read-side validation.
//!
//! # Modules
//!
//! - [`model`]: catalog entities (Catalog, Collection, Item, AssetRef, links)
//! - [`build`]: item/collection builders and the link resolver
//! - [`validation`]: tree validation and violation reporting
//! - [`io`]: document writer and lazy reader
//! - [`config`]: provider/license configuration input
//! - [`ingest`]: source asset discovery
//! - [`error`]: error types for terracat operations

pub mod build;
pub mod config;
pub mod error;
pub mod ingest;
pub mod io;
pub mod model;
pub mod validation;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::CatalogError;

/// The terracat CLI application.
#[derive(Parser)]
#[command(name = "terracat")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a published catalog for structural violations.
    Validate(ValidateArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Path to the root catalog document.
    root: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Skip asset href existence checks.
    #[arg(long)]
    no_assets: bool,

    /// Recompute checksums of local assets that record one.
    #[arg(long)]
    checksums: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the terracat CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CatalogError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("terracat {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Builder and validator for spatio-temporal asset catalogs.");
            println!();
            println!("Run 'terracat --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), CatalogError> {
    let reader = io::CatalogReader::open(&args.root)?;
    let (catalog, cross_refs) = reader.read_tree()?;

    // Links are derived data: recompute the graph from the loaded tree and
    // the cross-references recorded in the documents.
    let resolution = build::LinkResolver::new()
        .cross_refs(cross_refs)
        .resolve(&catalog)?;

    let opts = validation::ValidateOptions {
        check_assets: !args.no_assets,
        verify_checksums: args.checksums,
    };
    let report = validation::validate_catalog(&catalog, &resolution.graph, &opts)?;

    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report).map_err(|source| {
                CatalogError::DocWrite {
                    path: PathBuf::from("validation-report"),
                    source,
                }
            })?;
            println!("{}", json);
        }
        "text" => print!("{}", report),
        other => {
            return Err(CatalogError::UnsupportedFormat(format!(
                "'{}' (supported: text, json)",
                other
            )));
        }
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(CatalogError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
