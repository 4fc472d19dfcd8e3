#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that generates, encodes and previews island layouts.

mod config;
mod layout_transfer;
mod preview;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use isleweave_catalog::Catalog;
use isleweave_core::GridSpec;
use isleweave_system_analytics::LayoutReport;
use isleweave_system_generation::{derive_run_seed, seeded_rng, CellGraphGenerator, Generation};

use layout_transfer::LayoutCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Isleweave layout generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a layout and print it.
    Generate(GenerateArgs),
    /// Decode a layout code and print its preview.
    Inspect {
        /// Code produced by `generate --format code`.
        code: String,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Catalog manifest to draw tiles from. Uses the built-in catalog when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Generation options file.
    #[arg(long)]
    options: Option<PathBuf>,
    /// Session seed shared by every participant.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Regeneration counter within the session.
    #[arg(long, default_value_t = 0)]
    run: u32,
    /// Overrides the target cell count from the options file.
    #[arg(long)]
    target: Option<u32>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Box-drawing preview plus a one-line summary.
    Ascii,
    /// Resolved cells as JSON.
    Json,
    /// Single-line transfer code.
    Code,
    /// Run statistics as JSON.
    Report,
}

/// Entry point for the Isleweave command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate(&args),
        Command::Inspect { code } => inspect(&code),
    }
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_manifest_path(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => Catalog::standard(),
    };

    let mut options = config::load_options(args.options.as_deref())?;
    if let Some(target) = args.target {
        options.target_cells = target;
    }
    let grid = options.grid;

    let seed = derive_run_seed(args.seed, args.run);
    tracing::info!(
        target: "isleweave::cli",
        session_seed = args.seed,
        run = args.run,
        seed,
        "generate.start"
    );

    let generation = CellGraphGenerator::new(&catalog, options)
        .generate(&mut seeded_rng(seed))
        .context("generation options were rejected")?;

    let output = render_output(args.format, &grid, &generation)?;
    print!("{output}");
    Ok(())
}

fn render_output(
    format: OutputFormat,
    grid: &GridSpec,
    generation: &Generation,
) -> Result<String> {
    let output = match format {
        OutputFormat::Ascii => {
            let stats = generation.stats();
            format!(
                "{}{} of {} cells resolved ({} dropped, {} fallback forks)\n",
                preview::render(grid, generation.layout()),
                stats.resolved,
                stats.requested,
                stats.dropped,
                stats.fallback_forks,
            )
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(generation.layout())
                .context("failed to serialise layout")?;
            format!("{json}\n")
        }
        OutputFormat::Code => {
            let code = LayoutCode::new(*grid, generation.layout()).encode()?;
            format!("{code}\n")
        }
        OutputFormat::Report => {
            let report = LayoutReport::from_generation(generation);
            let json =
                serde_json::to_string_pretty(&report).context("failed to serialise report")?;
            format!("{json}\n")
        }
    };
    Ok(output)
}

fn inspect(code: &str) -> Result<()> {
    print!("{}", inspect_output(code)?);
    Ok(())
}

fn inspect_output(code: &str) -> Result<String> {
    let decoded = LayoutCode::decode(code).context("invalid layout code")?;
    let grid = decoded.grid;
    let layout = decoded.into_layout();
    let mut output = format!(
        "{}{} cells, {} bridges\n",
        preview::render(&grid, &layout),
        layout.len(),
        layout.bridges().count()
    );
    let hidden = preview::hidden_cells(&grid, &layout);
    if hidden > 0 {
        output.push_str(&format!("{hidden} cells lie outside the preview\n"));
    }
    Ok(output)
}
