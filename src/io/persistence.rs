//! Plain-text and JSON result files
//!
//! Cell files hold one cell per line as comma-separated coordinates, optionally
//! followed by a count, sorted by coordinates with no header: `0,0,12`.

use crate::analysis::counts::{AccumulatedCounts, CountsReport};
use crate::analysis::limit_shape::{IsoSurface, LimitShape2D};
use crate::io::error::{GrowthError, Result, WithPath};
use crate::spatial::{Cell, LatticeDiagram};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Open a file for buffered writing, creating parent directories
fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
    }
    let file = File::create(path).with_path(path, "create file")?;
    Ok(BufWriter::new(file))
}

fn join_coordinates<const D: usize>(cell: &Cell<D>) -> String {
    cell.coordinates()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Write accumulated counts as `x,y[,z],count` lines
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_cells<const D: usize>(path: &Path, counts: &AccumulatedCounts<D>) -> Result<()> {
    let mut writer = create_file(path)?;
    for (cell, count) in counts.iter() {
        writeln!(writer, "{},{count}", join_coordinates(cell)).with_path(path, "write cells")?;
    }
    writer.flush().with_path(path, "write cells")
}

/// Write a single diagram's cells as `x,y[,z]` lines
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_diagram<const D: usize>(path: &Path, diagram: &LatticeDiagram<D>) -> Result<()> {
    let mut writer = create_file(path)?;
    for cell in diagram.sorted_cells() {
        writeln!(writer, "{}", join_coordinates(&cell)).with_path(path, "write diagram")?;
    }
    writer.flush().with_path(path, "write diagram")
}

/// Parsed line: coordinates plus the optional trailing count
fn parse_line<const D: usize>(
    path: &Path,
    number: usize,
    line: &str,
) -> Result<(Cell<D>, Option<u64>)> {
    let parse_error = |reason: String| GrowthError::Parse {
        path: path.to_path_buf(),
        line: number,
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (coordinates, count) = match fields.len() {
        n if n == D => (fields.as_slice(), None),
        n if n == D + 1 => fields
            .split_last()
            .map(|(count, rest)| (rest, Some(*count)))
            .ok_or_else(|| parse_error("empty line".to_string()))?,
        n => {
            return Err(parse_error(format!(
                "expected {D} or {} fields, found {n}",
                D + 1
            )));
        }
    };

    let values = coordinates
        .iter()
        .map(|field| {
            field
                .parse::<u32>()
                .map_err(|e| parse_error(format!("coordinate {field:?}: {e}")))
        })
        .collect::<Result<Vec<u32>>>()?;
    let cell = Cell::try_from_slice(&values).map_err(|e| parse_error(e.to_string()))?;

    let count = count
        .map(|field| {
            field
                .parse::<u64>()
                .map_err(|e| parse_error(format!("count {field:?}: {e}")))
        })
        .transpose()?;

    Ok((cell, count))
}

/// Read every non-blank line of a cell file with its one-based line number
fn read_lines<const D: usize>(path: &Path) -> Result<Vec<(usize, Cell<D>, Option<u64>)>> {
    let file = File::open(path).with_path(path, "open cell file")?;
    let mut entries = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_path(path, "read cell file")?;
        if line.trim().is_empty() {
            continue;
        }
        let (cell, count) = parse_line(path, index + 1, &line)?;
        entries.push((index + 1, cell, count));
    }
    Ok(entries)
}

/// Read cells from a cell file, ignoring any counts
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is malformed
pub fn read_cells<const D: usize>(path: &Path) -> Result<Vec<Cell<D>>> {
    Ok(read_lines(path)?
        .into_iter()
        .map(|(_, cell, _)| cell)
        .collect())
}

/// Read accumulated counts back from a cell file
///
/// The run count is not stored, so it is taken to be the largest count.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a line is malformed, or a line
/// lacks its count
pub fn read_counts<const D: usize>(path: &Path) -> Result<AccumulatedCounts<D>> {
    let entries = read_lines::<D>(path)?
        .into_iter()
        .map(|(line, cell, count)| {
            count.map(|count| (cell, count)).ok_or_else(|| GrowthError::Parse {
                path: path.to_path_buf(),
                line,
                reason: format!("cell {cell} has no count"),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let runs = entries.iter().map(|&(_, count)| count).max().unwrap_or(0);
    Ok(AccumulatedCounts::from_entries(entries, runs))
}

/// Write the counts report as pretty-printed JSON
///
/// # Errors
///
/// Returns an error if the file cannot be created or encoding fails
pub fn write_counts_json(path: &Path, report: &CountsReport) -> Result<()> {
    let mut writer = create_file(path)?;
    serde_json::to_writer_pretty(&mut writer, report).map_err(|source| {
        GrowthError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writeln!(writer).with_path(path, "write counts")?;
    writer.flush().with_path(path, "write counts")
}

/// Write a planar limit shape as `x,y,frequency` rows with a header
///
/// Undefined grid points leave the frequency column empty.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_limit_shape_csv(path: &Path, shape: &LimitShape2D) -> Result<()> {
    let mut writer = create_file(path)?;
    writeln!(writer, "x,y,frequency").with_path(path, "write limit shape")?;
    for (i, x) in shape.grid_x.iter().enumerate() {
        for (j, y) in shape.grid_y.iter().enumerate() {
            let value = shape.value(i, j).map(|v| v.to_string()).unwrap_or_default();
            writeln!(writer, "{x},{y},{value}").with_path(path, "write limit shape")?;
        }
    }
    writer.flush().with_path(path, "write limit shape")
}

/// Write an isosurface as a Wavefront OBJ mesh
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_mesh_obj(path: &Path, surface: &IsoSurface) -> Result<()> {
    let mut writer = create_file(path)?;
    writeln!(
        writer,
        "# level {} scaling {}",
        surface.level, surface.scaling
    )
    .with_path(path, "write mesh")?;
    for [x, y, z] in &surface.vertices {
        writeln!(writer, "v {x} {y} {z}").with_path(path, "write mesh")?;
    }
    // OBJ indices are one-based
    for [a, b, c] in &surface.faces {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1).with_path(path, "write mesh")?;
    }
    writer.flush().with_path(path, "write mesh")
}
