// Output format writers
pub mod gmsh_writer;
pub mod xml_writer;
