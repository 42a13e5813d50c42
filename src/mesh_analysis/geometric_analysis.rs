use crate::database::*;          // MeshData, Point
use crate::error::*;             // ConvertError, ConvertResult

/// Geometry routines (signed area, orientation statistics)
pub struct GeometricAnalysis;

/// Orientation and size statistics over all elements of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshOrientationReport {
    pub total_elements: usize,
    pub min_area: f64,           // smallest signed area
    pub max_area: f64,           // largest signed area
    pub total_area: f64,         // sum of absolute areas
    pub clockwise_count: usize,  // elements with negative signed area
    pub degenerate_count: usize, // elements with zero area
}

impl GeometricAnalysis {
    /// Twice the signed area of triangle `(a, b, c)`: the z-component of
    /// `(b - a) x (c - a)`. Positive for counter-clockwise winding.
    pub fn cross_z(a: Point, b: Point, c: Point) -> f64 {
        let (e1x, e1y) = (b[0] - a[0], b[1] - a[1]); // first edge from a
        let (e2x, e2y) = (c[0] - a[0], c[1] - a[1]); // second edge from a
        e1x * e2y - e1y * e2x
    }

    /// Signed area of triangle `(a, b, c)`.
    pub fn signed_area(a: Point, b: Point, c: Point) -> f64 {
        0.5 * Self::cross_z(a, b, c)
    }

    /// Signed area of every element, in element order.
    pub fn element_areas(mesh_data: &MeshData) -> Vec<f64> {
        (0..mesh_data.num_elements())
            .map(|k| {
                let [a, b, c] = mesh_data.triangle_points(k);
                Self::signed_area(a, b, c)
            })
            .collect()
    }

    /// Analyse winding and size of all elements.
    pub fn analyse_mesh_orientation(mesh_data: &MeshData) -> ConvertResult<MeshOrientationReport> {
        if mesh_data.elements.is_empty() {
            return Err(ConvertError::GeometryError("No elements could be analyzed".to_string()));
        }

        let areas = Self::element_areas(mesh_data);

        let mut report = MeshOrientationReport {
            total_elements: areas.len(),
            min_area: f64::INFINITY,
            max_area: f64::NEG_INFINITY,
            total_area: 0.0,
            clockwise_count: 0,
            degenerate_count: 0,
        };

        for &area in &areas {
            report.min_area = report.min_area.min(area);
            report.max_area = report.max_area.max(area);
            report.total_area += area.abs();
            if area < 0.0 {
                report.clockwise_count += 1;
            } else if area == 0.0 {
                report.degenerate_count += 1;
            }
        }

        Ok(report)
    }
}
