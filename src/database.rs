use std::collections::BTreeSet;

/// Planar node coordinates `[x, y]`.
pub type Point = [f64; 2];

/// Triangle connectivity, 0-based node indices.
pub type Triangle = [usize; 3];

/// In-memory triangle mesh.
///
/// `elements` and `domains` are parallel: `domains[k]` is the region
/// attribute of `elements[k]`. Connectivity is always 0-based in memory;
/// the 1-based numbering of the file formats only exists at the reader and
/// writer boundaries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub points: Vec<Point>,           // one row per node, indexed from 0
    pub elements: Vec<Triangle>,      // ECT
    pub domains: Vec<i64>,            // region attribute per element
}

impl MeshData {
    pub fn new(points: Vec<Point>, elements: Vec<Triangle>, domains: Vec<i64>) -> Self {
        debug_assert_eq!(elements.len(), domains.len());
        MeshData { points, elements, domains }
    }

    pub fn num_nodes(&self) -> usize {
        self.points.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Distinct node indices used by at least one element, ascending.
    pub fn referenced_nodes(&self) -> BTreeSet<usize> {
        self.elements.iter().flat_map(|tri| tri.iter().copied()).collect()
    }

    /// Connectivity shifted to the 1-based numbering used on disk.
    pub fn connectivity_one_based(&self) -> Vec<[usize; 3]> {
        self.elements
            .iter()
            .map(|&[a, b, c]| [a + 1, b + 1, c + 1])
            .collect()
    }

    /// Corner coordinates of element `k`.
    pub fn triangle_points(&self, k: usize) -> [Point; 3] {
        let [a, b, c] = self.elements[k];
        [self.points[a], self.points[b], self.points[c]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_nodes_are_sorted_and_distinct() {
        let mesh = MeshData::new(
            vec![[0.0, 0.0]; 6],
            vec![[4, 1, 2], [2, 1, 5]],
            vec![1, 1],
        );
        let used: Vec<usize> = mesh.referenced_nodes().into_iter().collect();
        assert_eq!(used, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_connectivity_one_based() {
        let mesh = MeshData::new(vec![[0.0, 0.0]; 3], vec![[0, 1, 2]], vec![2]);
        assert_eq!(mesh.connectivity_one_based(), vec![[1, 2, 3]]);
        assert_eq!(mesh.num_nodes(), 3);
        assert_eq!(mesh.num_elements(), 1);
    }
}
