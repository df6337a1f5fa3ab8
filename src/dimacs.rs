//! Graph text formats.
//!
//! Two formats are read:
//!
//! - DIMACS: `c` comment lines, one `p edge N M` problem line, then `e U V` edge lines with
//!   1-based vertex ids.
//! - Adjacency matrix: one row per line, each a string of `0`/`1` (whitespace between entries
//!   is ignored). The matrix must be square, symmetric, and zero on the diagonal.
//!
//! Both parse into a [`ParsedGraph`] (vertex count plus 0-based edge list), which
//! [`ParsedGraph::into_graph`] turns into a [`BitGraph`].

use crate::error::ParseError;
use crate::graph::BitGraph;
use std::io::BufRead;
use std::path::Path;

/// Supported input formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// DIMACS edge format.
    #[default]
    Dimacs,
    /// 0/1 adjacency matrix.
    Matrix,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dimacs" | "clq" | "col" => Ok(Self::Dimacs),
            "matrix" | "adj" => Ok(Self::Matrix),
            _ => Err(format!("unknown format '{s}' (expected dimacs or matrix)")),
        }
    }
}

/// A graph as read from text, before validation by [`BitGraph::build`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedGraph {
    /// Number of vertices.
    pub n: usize,
    /// Edges with 0-based endpoints, in input order.
    pub edges: Vec<(usize, usize)>,
}

impl ParsedGraph {
    /// Builds the bit-parallel graph.
    ///
    /// # Errors
    /// Returns [`ParseError::Graph`] for self-loops or out-of-range endpoints.
    pub fn into_graph(self) -> Result<BitGraph, ParseError> {
        Ok(BitGraph::build(self.n, &self.edges)?)
    }
}

fn malformed(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::Malformed {
        line,
        message: message.into(),
    }
}

fn parse_field(line: usize, field: Option<&str>, what: &str) -> Result<usize, ParseError> {
    let field = field.ok_or_else(|| malformed(line, format!("missing {what}")))?;
    field
        .parse()
        .map_err(|_| malformed(line, format!("invalid {what} '{field}'")))
}

// ============================================================================
// DIMACS
// ============================================================================

/// Parses DIMACS edge format from a reader.
///
/// # Errors
/// Returns [`ParseError`] on I/O failure, a missing or repeated problem line, an edge before
/// the problem line, a malformed line, or a vertex id of zero.
pub fn read_dimacs<R: BufRead>(reader: R) -> Result<ParsedGraph, ParseError> {
    let mut header: Option<(usize, usize)> = None;
    let mut edges = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        let line = line.trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            None => {}
            Some(tag) if tag.starts_with('c') => {}
            Some("p") => {
                if header.is_some() {
                    return Err(malformed(lineno, "duplicate problem line"));
                }
                match parts.next() {
                    Some("edge" | "col") => {}
                    Some(other) => {
                        return Err(malformed(lineno, format!("unsupported problem type '{other}'")))
                    }
                    None => return Err(malformed(lineno, "missing problem type")),
                }
                let n = parse_field(lineno, parts.next(), "vertex count")?;
                let m = parse_field(lineno, parts.next(), "edge count")?;
                edges.reserve(m.min(1 << 20));
                header = Some((n, m));
            }
            Some("e") => {
                if header.is_none() {
                    return Err(malformed(lineno, "edge before problem line"));
                }
                let u = parse_field(lineno, parts.next(), "edge endpoint")?;
                let v = parse_field(lineno, parts.next(), "edge endpoint")?;
                if u == 0 || v == 0 {
                    return Err(malformed(lineno, "vertex ids are 1-based"));
                }
                edges.push((u - 1, v - 1));
            }
            Some(other) => return Err(malformed(lineno, format!("unknown line type '{other}'"))),
        }
    }

    let (n, m) = header.ok_or(ParseError::MissingProblemLine)?;
    if edges.len() != m {
        log::warn!(
            "problem line declares {m} edges but {} were read",
            edges.len()
        );
    }
    Ok(ParsedGraph { n, edges })
}

/// Parses DIMACS edge format from a string.
///
/// # Errors
/// See [`read_dimacs`].
pub fn parse_dimacs(text: &str) -> Result<ParsedGraph, ParseError> {
    read_dimacs(text.as_bytes())
}

// ============================================================================
// Adjacency matrix
// ============================================================================

/// Parses a 0/1 adjacency matrix.
///
/// Blank lines are skipped. Line numbers in errors refer to the input text.
///
/// # Errors
/// Returns [`ParseError`] for an empty or non-square matrix, an entry other than `0`/`1`,
/// a set diagonal entry, or an asymmetric pair.
pub fn parse_matrix(text: &str) -> Result<ParsedGraph, ParseError> {
    let rows: Vec<(usize, Vec<bool>)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(lineno, line)| {
            line.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    '0' => Ok(false),
                    '1' => Ok(true),
                    other => Err(malformed(lineno, format!("invalid matrix entry '{other}'"))),
                })
                .collect::<Result<Vec<bool>, ParseError>>()
                .map(|row| (lineno, row))
        })
        .collect::<Result<_, _>>()?;

    if rows.is_empty() {
        return Err(ParseError::EmptyMatrix);
    }
    let n = rows.len();
    for (lineno, row) in &rows {
        if row.len() != n {
            return Err(malformed(
                *lineno,
                format!("row has {} entries, expected {n}", row.len()),
            ));
        }
    }

    let mut edges = Vec::new();
    for i in 0..n {
        if rows[i].1[i] {
            return Err(crate::error::GraphError::SelfLoop { vertex: i }.into());
        }
        for j in (i + 1)..n {
            if rows[i].1[j] != rows[j].1[i] {
                return Err(ParseError::NotSymmetric { i, j });
            }
            if rows[i].1[j] {
                edges.push((i, j));
            }
        }
    }
    Ok(ParsedGraph { n, edges })
}

// ============================================================================
// Files
// ============================================================================

/// Reads and builds a graph from `path`.
///
/// # Errors
/// Returns [`ParseError`] on I/O failure, malformed text, or an invalid edge list.
pub fn read_graph(path: &Path, format: Format) -> Result<BitGraph, ParseError> {
    let parsed = match format {
        Format::Dimacs => {
            let file = std::fs::File::open(path)?;
            read_dimacs(std::io::BufReader::new(file))?
        }
        Format::Matrix => parse_matrix(&std::fs::read_to_string(path)?)?,
    };
    log::info!(
        "read {} vertices and {} edges from {}",
        parsed.n,
        parsed.edges.len(),
        path.display()
    );
    parsed.into_graph()
}
