//! peter2gmsh: convert a node/element text mesh to Gmsh ASCII 2.2.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use peter2gmsh::writer::xml_writer::VTUWriter;
use peter2gmsh::{convert, ConversionConfig};

#[derive(Parser)]
#[command(name = "peter2gmsh")]
#[command(version, about = "Convert a node/element text mesh to Gmsh ASCII 2.2")]
struct Cli {
    /// Input mesh in node/element text format.
    infile: PathBuf,

    /// Output Gmsh .msh file.
    outfile: PathBuf,

    /// Coordinate scaling factor (default 1e-3, millimetres to metres).
    #[arg(short, long)]
    scale: Option<f64>,

    /// TOML file with `scale` and a `[regions]` table.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the normalized mesh as a VTK XML unstructured grid.
    #[arg(long)]
    vtu: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConversionConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConversionConfig::default(),
    };
    if let Some(scale) = cli.scale {
        config = config.with_scale(scale);
    }

    let (mesh, summary) = convert(&cli.infile, &cli.outfile, &config).with_context(|| {
        format!("converting {} to {}", cli.infile.display(), cli.outfile.display())
    })?;

    if let Some(vtu_path) = &cli.vtu {
        VTUWriter::write_vtu(&mesh, vtu_path)?;
    }

    println!(
        "{} -> {}: {} nodes, {} elements ({} orphan nodes removed, {} elements reoriented)",
        cli.infile.display(),
        cli.outfile.display(),
        summary.num_nodes,
        summary.num_elements,
        summary.normalization.orphans_removed,
        summary.normalization.flipped,
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
