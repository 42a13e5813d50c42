// src/lib.rs

pub mod config;
pub mod database;
pub mod error;
pub mod mesh_analysis;
pub mod parser;
pub mod writer;

use std::path::Path;

use tracing::info;

pub use config::{ConversionConfig, RegionTable};
pub use database::MeshData;
pub use error::{ConvertError, ConvertResult};
use mesh_analysis::geometric_analysis::{GeometricAnalysis, MeshOrientationReport};
use mesh_analysis::normalizer::NormalizationReport;
use parser::peter_txt::PeterTxtParser;
use writer::gmsh_writer::GmshWriter;

/// Outcome of one conversion.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub num_nodes: usize,
    pub num_elements: usize,
    pub normalization: NormalizationReport,
    pub orientation: Option<MeshOrientationReport>,  // None for an empty mesh
}

/// Read `infile`, normalize, and write it to `outfile` as Gmsh 2.2.
pub fn convert(
    infile: impl AsRef<Path>,
    outfile: impl AsRef<Path>,
    config: &ConversionConfig,
) -> ConvertResult<(MeshData, ConversionSummary)> {
    config.validate()?;

    let (mesh, normalization) = PeterTxtParser::parse_file(infile, config.scale)?;
    GmshWriter::write_msh(&mesh, &config.regions, outfile)?;

    let orientation = GeometricAnalysis::analyse_mesh_orientation(&mesh).ok();
    if let Some(report) = &orientation {
        info!(
            "element areas: min {:.6e}, max {:.6e}, total {:.6e}",
            report.min_area, report.max_area, report.total_area
        );
    }

    let summary = ConversionSummary {
        num_nodes: mesh.num_nodes(),
        num_elements: mesh.num_elements(),
        normalization,
        orientation,
    };
    Ok((mesh, summary))
}
