use rayon::prelude::*;
use tracing::{debug, warn};

use crate::database::*;
use super::geometric_analysis::GeometricAnalysis;

/// What normalization changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub orphans_removed: usize,   // nodes dropped because no element uses them
    pub flipped: usize,           // clockwise elements turned counter-clockwise
    pub degenerate: usize,        // zero-area elements (kept as they are)
}

/// Removes orphan nodes and enforces counter-clockwise winding.
pub struct MeshNormalizer;

impl MeshNormalizer {
    /// Keep only nodes referenced by `elements`, in ascending original index
    /// order, and remap connectivity into the compacted index space.
    /// Returns the new points, new connectivity and the number of nodes dropped.
    pub fn filter_orphan_nodes(
        points: &[Point],
        elements: &[Triangle],
    ) -> (Vec<Point>, Vec<Triangle>, usize) {
        // new_index[old] is Some(new) for kept nodes
        let mut new_index: Vec<Option<usize>> = vec![None; points.len()];
        for tri in elements {
            for &node in tri {
                new_index[node] = Some(0);
            }
        }

        let mut kept = Vec::with_capacity(points.len());
        for (old, slot) in new_index.iter_mut().enumerate() {
            if slot.is_some() {
                *slot = Some(kept.len());
                kept.push(points[old]);
            }
        }

        let remapped = elements
            .iter()
            .map(|tri| tri.map(|node| new_index[node].unwrap_or(node)))
            .collect();

        let removed = points.len() - kept.len();
        (kept, remapped, removed)
    }

    /// Corrected copy of `tri`: 2nd and 3rd vertex swapped when the signed
    /// area is negative, unchanged otherwise.
    pub fn orient_triangle(points: &[Point], tri: Triangle) -> Triangle {
        let [a, b, c] = tri;
        if GeometricAnalysis::cross_z(points[a], points[b], points[c]) < 0.0 {
            [a, c, b]
        } else {
            tri
        }
    }

    /// Orient every element; returns the new connectivity, the flip count and
    /// the degenerate count.
    pub fn orient_elements(points: &[Point], elements: &[Triangle]) -> (Vec<Triangle>, usize, usize) {
        let oriented: Vec<(Triangle, bool, bool)> = elements
            .par_iter()
            .map(|&tri| {
                let [a, b, c] = tri;
                let cross = GeometricAnalysis::cross_z(points[a], points[b], points[c]);
                let fixed = Self::orient_triangle(points, tri);
                (fixed, fixed != tri, cross == 0.0)
            })
            .collect();

        let flipped = oriented.iter().filter(|(_, f, _)| *f).count();
        let degenerate = oriented.iter().filter(|(_, _, d)| *d).count();
        let tris = oriented.into_iter().map(|(t, _, _)| t).collect();
        (tris, flipped, degenerate)
    }

    /// Filter orphan nodes, then fix orientation. Region tags are untouched.
    ///
    /// Connectivity must already be 0-based and in range for `mesh.points`.
    pub fn normalize(mesh: MeshData) -> (MeshData, NormalizationReport) {
        let MeshData { points, elements, domains } = mesh;

        let (points, elements, orphans_removed) = Self::filter_orphan_nodes(&points, &elements);
        let (elements, flipped, degenerate) = Self::orient_elements(&points, &elements);

        debug!(orphans_removed, flipped, degenerate, "normalized mesh");
        if degenerate > 0 {
            warn!("{} element(s) have zero area", degenerate);
        }

        let report = NormalizationReport { orphans_removed, flipped, degenerate };
        (MeshData::new(points, elements, domains), report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Point> {
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
    }

    #[test]
    fn test_orient_triangle_swaps_clockwise() {
        let points = square_points();
        assert_eq!(MeshNormalizer::orient_triangle(&points, [0, 2, 1]), [0, 1, 2]);
        assert_eq!(MeshNormalizer::orient_triangle(&points, [0, 1, 2]), [0, 1, 2]);
    }

    #[test]
    fn test_orient_triangle_keeps_degenerate() {
        let points = vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        assert_eq!(MeshNormalizer::orient_triangle(&points, [0, 2, 1]), [0, 2, 1]);
    }

    #[test]
    fn test_filter_orphans_is_stable_by_original_index() {
        // nodes 0, 2 and 5 unused
        let points: Vec<Point> = (0..7).map(|i| [i as f64, 0.0]).collect();
        let elements = vec![[6, 1, 3], [3, 4, 1]];
        let (kept, remapped, removed) = MeshNormalizer::filter_orphan_nodes(&points, &elements);

        assert_eq!(removed, 3);
        assert_eq!(kept, vec![[1.0, 0.0], [3.0, 0.0], [4.0, 0.0], [6.0, 0.0]]);
        assert_eq!(remapped, vec![[3, 0, 1], [1, 2, 0]]);
    }

    #[test]
    fn test_normalize_leaves_no_orphans_and_no_clockwise() {
        let mut points = square_points();
        points.push([5.0, 5.0]); // orphan
        let mesh = MeshData::new(points, vec![[0, 2, 1], [0, 3, 2]], vec![1, 2]);

        let (mesh, report) = MeshNormalizer::normalize(mesh);
        assert_eq!(report, NormalizationReport { orphans_removed: 1, flipped: 2, degenerate: 0 });
        assert_eq!(mesh.num_nodes(), mesh.referenced_nodes().len());
        assert_eq!(mesh.domains, vec![1, 2]);
        for area in GeometricAnalysis::element_areas(&mesh) {
            assert!(area >= 0.0);
        }
    }
}
