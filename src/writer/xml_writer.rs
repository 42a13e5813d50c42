use vtkio::model::*; // import model definition of a VTK file

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::database::*;  // MeshData
use crate::error::*;

pub struct VTUWriter;  // VTK XML unstructured grid (.vtu) export of a triangle mesh

impl VTUWriter {

    /// Write the mesh as a `.vtu` file with the region attribute of every
    /// element stored as the cell scalar `Region`.
    pub fn write_vtu(
        mesh_data: &MeshData,
        output_path: impl AsRef<Path>,
    ) -> ConvertResult<()> {
        let output_path = output_path.as_ref();
        let vtu = Self::to_xml_bytes(mesh_data)
            .map_err(|e| ConvertError::write_failure(output_path, io::Error::other(e.to_string())))?;

        fs::write(output_path, &vtu)
            .map_err(|e| ConvertError::write_failure(output_path, e))?;

        info!("wrote VTU file {}", output_path.display());
        Ok(())
    }

    /// Serialize the mesh to VTU XML in memory.
    pub fn to_xml_bytes(mesh_data: &MeshData) -> Result<Vec<u8>, vtkio::Error> {
        let mut vtu = Vec::new();

        // 1. Points, padded to 3D
        let points_data: Vec<f64> = mesh_data
            .points
            .iter()
            .flat_map(|&[x, y]| [x, y, 0.0])
            .collect();

        // 2. Connectivity and offsets, 3 nodes per cell
        let connectivity: Vec<u64> = mesh_data
            .elements
            .iter()
            .flat_map(|tri| tri.iter().map(|&id| id as u64))
            .collect();
        let offsets: Vec<u64> = (1..=mesh_data.num_elements() as u64).map(|k| 3 * k).collect();
        let cell_types = vec![CellType::Triangle; mesh_data.num_elements()];

        // 3. Region attribute per cell
        let region = Attribute::scalars("Region", 1)
            .with_data(IOBuffer::I64(mesh_data.domains.clone()));

        Vtk {
            version: Version { major: 2, minor: 2 },
            title: String::new(),
            byte_order: ByteOrder::LittleEndian,
            file_path: None,
            data: DataSet::inline(UnstructuredGridPiece {
                points: IOBuffer::F64(points_data),
                cells: Cells {
                    cell_verts: VertexNumbers::XML {
                        connectivity,
                        offsets,
                    },
                    types: cell_types,
                },
                data: Attributes {
                    point: Vec::new(),
                    cell: vec![region],
                },
            }),
        }.write_xml(&mut vtu)?;

        Ok(vtu)
    }

}
