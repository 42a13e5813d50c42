use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::config::RegionTable;
use crate::database::*;
use crate::error::*;

/// Gmsh element type id for a 3-node triangle.
const GMSH_TRIANGLE: u32 = 2;
/// Dimension of the physical groups (surfaces).
const PHYSICAL_DIMENSION: u32 = 2;

/// Writer for the Gmsh ASCII 2.2 mesh format.
pub struct GmshWriter;

impl GmshWriter {
    /// Write `mesh_data` to `output_path`.
    ///
    /// Region attributes are checked before the file is created, so an
    /// out-of-range attribute leaves no output behind.
    pub fn write_msh(
        mesh_data: &MeshData,
        regions: &RegionTable,
        output_path: impl AsRef<Path>,
    ) -> ConvertResult<()> {
        let output_path = output_path.as_ref();
        Self::check_attributes(mesh_data, regions)?;

        let file = File::create(output_path)
            .map_err(|e| ConvertError::write_failure(output_path, e))?;
        let mut writer = BufWriter::new(file);
        Self::write_sections(&mut writer, mesh_data, regions)
            .and_then(|_| writer.flush())
            .map_err(|e| ConvertError::write_failure(output_path, e))?;

        info!(
            "wrote {} nodes and {} elements to {}",
            mesh_data.num_nodes(),
            mesh_data.num_elements(),
            output_path.display()
        );
        Ok(())
    }

    /// Serialize into any writer (e.g. a `Vec<u8>`).
    pub fn write_to<W: Write>(writer: W, mesh_data: &MeshData, regions: &RegionTable) -> ConvertResult<()> {
        Self::check_attributes(mesh_data, regions)?;
        Self::write_sections(writer, mesh_data, regions)?;
        Ok(())
    }

    /// Every attribute must lie in `1..=regions.len()`.
    pub fn check_attributes(mesh_data: &MeshData, regions: &RegionTable) -> ConvertResult<()> {
        for (k, &attribute) in mesh_data.domains.iter().enumerate() {
            if regions.region_for(attribute).is_none() {
                return Err(ConvertError::IndexOutOfRange {
                    element: k + 1,
                    attribute,
                    len: regions.len(),
                });
            }
        }
        Ok(())
    }

    // $MeshFormat, $PhysicalNames, $Nodes, $Elements, in that order
    fn write_sections<W: Write>(mut writer: W, mesh_data: &MeshData, regions: &RegionTable) -> io::Result<()> {
        writeln!(writer, "$MeshFormat")?;
        writeln!(writer, "2.2 0 8")?;
        writeln!(writer, "$EndMeshFormat")?;

        writeln!(writer, "$PhysicalNames")?;
        writeln!(writer, "{}", regions.names.len())?;
        for (i, name) in regions.names.iter().enumerate() {
            writeln!(writer, "{} {} \"{}\"", PHYSICAL_DIMENSION, i + 1, name)?;
        }
        writeln!(writer, "$EndPhysicalNames")?;

        writeln!(writer, "$Nodes")?;
        writeln!(writer, "{}", mesh_data.num_nodes())?;
        for (i, [x, y]) in mesh_data.points.iter().enumerate() {
            writeln!(writer, "{} {:.16e} {:.16e} {:.16e}", i + 1, x, y, 0.0)?;
        }
        writeln!(writer, "$EndNodes")?;

        writeln!(writer, "$Elements")?;
        writeln!(writer, "{}", mesh_data.num_elements())?;
        let connectivity = mesh_data.connectivity_one_based();
        for (k, ([v0, v1, v2], &attribute)) in connectivity.iter().zip(&mesh_data.domains).enumerate() {
            // attributes were checked before any output was produced
            let region = regions.region_for(attribute).unwrap_or_default();
            writeln!(
                writer,
                "{} {} 2 {} {} {} {} {}",
                k + 1,
                GMSH_TRIANGLE,
                attribute,
                region,
                v0,
                v1,
                v2
            )?;
        }
        writeln!(writer, "$EndElements")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> MeshData {
        MeshData::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], vec![[0, 1, 2]], vec![1])
    }

    fn render(mesh: &MeshData, regions: &RegionTable) -> String {
        let mut out = Vec::new();
        GmshWriter::write_to(&mut out, mesh, regions).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_element_region_lookup() {
        let regions = RegionTable::new(vec![6], vec!["pot".to_string()]);
        let text = render(&single_triangle(), &regions);

        let lines: Vec<&str> = text.lines().collect();
        let start = lines.iter().position(|l| *l == "$Elements").unwrap();
        assert_eq!(lines[start + 1], "1");
        assert_eq!(lines[start + 2], "1 2 2 1 6 1 2 3");
        assert_eq!(lines[start + 3], "$EndElements");
    }

    #[test]
    fn test_section_order_and_header() {
        let text = render(&single_triangle(), &RegionTable::default());
        let keywords: Vec<&str> = text.lines().filter(|l| l.starts_with('$')).collect();
        assert_eq!(
            keywords,
            vec![
                "$MeshFormat",
                "$EndMeshFormat",
                "$PhysicalNames",
                "$EndPhysicalNames",
                "$Nodes",
                "$EndNodes",
                "$Elements",
                "$EndElements",
            ]
        );
        assert_eq!(text.lines().nth(1), Some("2.2 0 8"));
    }

    #[test]
    fn test_physical_names_block() {
        let text = render(&single_triangle(), &RegionTable::default());
        assert!(text.contains("$PhysicalNames\n3\n2 1 \"pot\"\n2 2 \"stamp\"\n2 3 \"melt\"\n$EndPhysicalNames\n"));
    }

    #[test]
    fn test_node_lines_are_one_based_with_zero_z() {
        let text = render(&single_triangle(), &RegionTable::default());
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.iter().position(|l| *l == "$Nodes").unwrap();
        assert_eq!(lines[start + 1], "3");

        let fields: Vec<&str> = lines[start + 3].split_whitespace().collect();
        assert_eq!(fields[0], "2");
        assert_eq!(fields[1].parse::<f64>().unwrap(), 1.0);
        assert_eq!(fields[2].parse::<f64>().unwrap(), 0.0);
        assert_eq!(fields[3].parse::<f64>().unwrap(), 0.0);
        assert!(fields[1].contains('e'));
    }

    #[test]
    fn test_attribute_out_of_range() {
        let mut mesh = single_triangle();
        mesh.domains = vec![4];
        let err = GmshWriter::write_to(Vec::new(), &mesh, &RegionTable::default()).unwrap_err();
        assert!(matches!(err, ConvertError::IndexOutOfRange { element: 1, attribute: 4, len: 3 }));

        mesh.domains = vec![0];
        assert!(GmshWriter::check_attributes(&mesh, &RegionTable::default()).is_err());
    }

    #[test]
    fn test_out_of_range_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.msh");
        let mut mesh = single_triangle();
        mesh.domains = vec![9];

        assert!(GmshWriter::write_msh(&mesh, &RegionTable::default(), &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.msh");
        let err = GmshWriter::write_msh(&single_triangle(), &RegionTable::default(), &path).unwrap_err();
        assert!(matches!(err, ConvertError::WriteFailure { .. }));
    }
}
