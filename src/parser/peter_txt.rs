use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::database::*;                                   // MeshData, Point, Triangle
use crate::error::*;                                      // ConvertError, ConvertResult
use crate::mesh_analysis::normalizer::{MeshNormalizer, NormalizationReport};

type NumberedLines<'a> = dyn Iterator<Item = (usize, io::Result<String>)> + 'a;

/// Reader for the node/element text format:
///
/// ```text
/// n
/// x y            (n coordinate rows, 2 or 3 columns)
/// m
/// a b c tag      (m element rows, 1-based vertex ids)
/// ```
pub struct PeterTxtParser;

impl PeterTxtParser {
    /// Read and normalize a mesh file from disk.
    pub fn parse_file(path: impl AsRef<Path>, scale: f64) -> ConvertResult<(MeshData, NormalizationReport)> {
        let path = path.as_ref();
        let file = File::open(path)?;
        info!("reading {}", path.display());
        Self::read_with_report(BufReader::new(file), scale)
    }

    /// Read, scale and normalize a mesh: no orphan nodes, counter-clockwise
    /// elements, 0-based connectivity.
    pub fn read<R: BufRead>(reader: R, scale: f64) -> ConvertResult<MeshData> {
        Self::read_with_report(reader, scale).map(|(mesh, _)| mesh)
    }

    pub fn read_with_report<R: BufRead>(
        reader: R,
        scale: f64,
    ) -> ConvertResult<(MeshData, NormalizationReport)> {
        let raw = Self::read_raw(reader, scale)?;
        let (mesh, report) = MeshNormalizer::normalize(raw);
        info!(
            "mesh has {} nodes and {} elements after normalization ({} orphan nodes removed, {} elements flipped)",
            mesh.num_nodes(),
            mesh.num_elements(),
            report.orphans_removed,
            report.flipped
        );
        Ok((mesh, report))
    }

    /// Parse and scale without normalizing. Connectivity is converted to
    /// 0-based and checked against the node count.
    pub fn read_raw<R: BufRead>(reader: R, scale: f64) -> ConvertResult<MeshData> {
        let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));

        // Node block
        let num_nodes = Self::parse_count(&mut lines, "node")?;
        let (node_block, node_lines) = Self::stage_block(&mut lines, num_nodes, "node")?;
        let mut points = Self::parse_coordinates(node_block, &node_lines)?;
        for point in points.iter_mut() {
            point[0] *= scale;
            point[1] *= scale;
        }
        debug!(num_nodes, scale, "parsed coordinate block");

        // Element block
        let num_elements = Self::parse_count(&mut lines, "element")?;
        let (element_block, element_lines) = Self::stage_block(&mut lines, num_elements, "element")?;
        let (elements, domains) = Self::parse_elements(element_block, &element_lines, num_nodes)?;
        debug!(num_elements, "parsed element block");

        if let Some((line_no, _)) = Self::next_non_empty_line(&mut lines)? {
            debug!("ignoring trailing content from line {}", line_no);
        }

        Ok(MeshData::new(points, elements, domains))
    }

    // Skip blank lines; None at end of input
    fn next_non_empty_line(lines: &mut NumberedLines<'_>) -> ConvertResult<Option<(usize, String)>> {
        while let Some((line_no, line)) = lines.next() {
            let line = line.map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => ConvertError::parse(line_no, "line is not valid UTF-8"),
                _ => ConvertError::Io(e),
            })?;
            if !line.trim().is_empty() {
                return Ok(Some((line_no, line)));
            }
        }
        Ok(None)
    }

    // Count line preceding a block, e.g. "2607"
    fn parse_count(lines: &mut NumberedLines<'_>, section: &'static str) -> ConvertResult<usize> {
        let (line_no, line) = Self::next_non_empty_line(lines)?.ok_or(ConvertError::TruncatedInput {
            section,
            declared: 1,
            found: 0,
        })?;

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 1 {
            return Err(ConvertError::parse(
                line_no,
                format!("expected a single {} count, found {} fields", section, tokens.len()),
            ));
        }
        tokens[0].parse::<usize>().map_err(|e| {
            ConvertError::parse(line_no, format!("invalid {} count '{}': {}", section, tokens[0], e))
        })
    }

    // A lone integer is the next section's count line, never a data row
    fn is_count_line(line: &str) -> bool {
        let mut tokens = line.split_whitespace();
        matches!((tokens.next(), tokens.next()), (Some(token), None) if token.parse::<usize>().is_ok())
    }

    /// Copy the next `count` non-empty lines into a scratch file and rewind
    /// it. The file is anonymous and disappears when dropped.
    ///
    /// Running into end of input or into the next count line before `count`
    /// rows are staged is reported as `TruncatedInput`.
    fn stage_block(
        lines: &mut NumberedLines<'_>,
        count: usize,
        section: &'static str,
    ) -> ConvertResult<(File, Vec<usize>)> {
        let mut scratch = tempfile::tempfile()?;
        let mut line_numbers = Vec::with_capacity(count.min(1 << 16)); // count is untrusted

        {
            let mut writer = BufWriter::new(&mut scratch);
            while line_numbers.len() < count {
                match Self::next_non_empty_line(lines)? {
                    Some((line_no, line)) if !Self::is_count_line(&line) => {
                        writeln!(writer, "{}", line.trim())?;
                        line_numbers.push(line_no);
                    }
                    _ => {
                        return Err(ConvertError::TruncatedInput {
                            section,
                            declared: count,
                            found: line_numbers.len(),
                        });
                    }
                }
            }
            writer.flush()?;
        }

        scratch.seek(SeekFrom::Start(0))?;
        Ok((scratch, line_numbers))
    }

    // Numeric table of 2 or 3 columns; every row must match the first
    fn parse_coordinates(block: File, line_numbers: &[usize]) -> ConvertResult<Vec<Point>> {
        let mut points = Vec::with_capacity(line_numbers.len());
        let mut columns: Option<usize> = None;

        for (row, &line_no) in BufReader::new(block).lines().zip(line_numbers) {
            let row = row?;
            let values: Vec<f64> = row
                .split_whitespace()
                .map(|s| match s.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    Ok(_) => Err(ConvertError::parse(line_no, format!("non-finite coordinate '{}'", s))),
                    Err(e) => Err(ConvertError::parse(line_no, format!("invalid coordinate '{}': {}", s, e))),
                })
                .collect::<ConvertResult<_>>()?;

            if !(2..=3).contains(&values.len()) {
                return Err(ConvertError::parse(
                    line_no,
                    format!("expected 2 or 3 coordinates, found {}", values.len()),
                ));
            }
            match columns {
                None => columns = Some(values.len()),
                Some(n) if n != values.len() => {
                    return Err(ConvertError::parse(
                        line_no,
                        format!("expected {} coordinates like the first node, found {}", n, values.len()),
                    ));
                }
                Some(_) => {}
            }

            points.push([values[0], values[1]]); // planar mesh, z is not kept
        }

        Ok(points)
    }

    // Rows of "a b c tag"; vertex ids converted from 1-based to 0-based
    fn parse_elements(
        block: File,
        line_numbers: &[usize],
        num_nodes: usize,
    ) -> ConvertResult<(Vec<Triangle>, Vec<i64>)> {
        let mut elements = Vec::with_capacity(line_numbers.len());
        let mut domains = Vec::with_capacity(line_numbers.len());

        for (elem_idx, (row, &line_no)) in BufReader::new(block).lines().zip(line_numbers).enumerate() {
            let row = row?;
            let fields: Vec<i64> = row
                .split_whitespace()
                .map(|s| {
                    s.parse::<i64>()
                        .map_err(|e| ConvertError::parse(line_no, format!("invalid integer '{}': {}", s, e)))
                })
                .collect::<ConvertResult<_>>()?;

            if fields.len() != 4 {
                return Err(ConvertError::parse(
                    line_no,
                    format!("expected 3 vertex ids and a region tag, found {} fields", fields.len()),
                ));
            }

            let mut tri: Triangle = [0; 3];
            for (slot, &vertex) in tri.iter_mut().zip(&fields[..3]) {
                if vertex < 1 || vertex as u64 > num_nodes as u64 {
                    return Err(ConvertError::InvalidConnectivity {
                        element: elem_idx + 1,
                        vertex,
                        num_nodes,
                    });
                }
                *slot = (vertex - 1) as usize;
            }

            elements.push(tri);
            domains.push(fields[3]);
        }

        Ok((elements, domains))
    }
}
