// Mesh geometry and clean-up
pub mod geometric_analysis;
pub mod normalizer;
