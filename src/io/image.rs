//! PNG rendering of accumulated frequencies and planar limit shapes

use crate::analysis::counts::AccumulatedCounts;
use crate::analysis::limit_shape::LimitShape2D;
use crate::io::configuration::HEATMAP_CELL_PIXELS;
use crate::io::error::{GrowthError, Result, WithPath};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::path::Path;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// White at zero frequency through to saturated red at one
fn frequency_color(frequency: f64) -> Rgba<u8> {
    let fade = (255.0 * (1.0 - frequency.clamp(0.0, 1.0))).round() as u8;
    Rgba([255, fade, fade, 255])
}

fn save(img: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
    }
    img.save(path).map_err(|source| GrowthError::ImageExport {
        path: path.to_path_buf(),
        source,
    })
}

/// Render normalized counts projected onto the first two axes
///
/// Each lattice cell becomes a `HEATMAP_CELL_PIXELS` square, the origin at the
/// bottom left. For solid diagrams a column shows its highest frequency.
/// Uncounted cells are transparent.
///
/// # Errors
///
/// Returns `NoDataAvailable` for empty counts, or an error if the image cannot
/// be saved
pub fn export_heatmap_png<const D: usize>(
    path: &Path,
    counts: &AccumulatedCounts<D>,
) -> Result<()> {
    let extents = counts.axis_extents().ok_or(GrowthError::NoDataAvailable {
        operation: "heatmap export",
    })?;
    let columns = extents.first().map_or(0, |&x| x + 1);
    let rows = extents.get(1).map_or(1, |&y| y + 1);

    let mut projected: BTreeMap<(u32, u32), f64> = BTreeMap::new();
    for (cell, frequency) in counts.normalized() {
        let key = (cell.coordinate(0).unwrap_or(0), cell.coordinate(1).unwrap_or(0));
        let entry = projected.entry(key).or_insert(0.0);
        *entry = entry.max(frequency);
    }

    let scale = HEATMAP_CELL_PIXELS;
    let mut img: RgbaImage = ImageBuffer::from_pixel(columns * scale, rows * scale, TRANSPARENT);
    for ((x, y), frequency) in projected {
        let color = frequency_color(frequency);
        let top = (rows - 1 - y) * scale;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(x * scale + dx, top + dy, color);
            }
        }
    }

    save(&img, path)
}

/// Render a planar limit shape with one pixel per grid point
///
/// Undefined grid points are transparent; the origin is at the bottom left.
///
/// # Errors
///
/// Returns an error if the image cannot be saved
pub fn export_field_png(path: &Path, shape: &LimitShape2D) -> Result<()> {
    let (width, height) = shape.values.dim();
    let mut img: RgbaImage = ImageBuffer::from_pixel(width as u32, height as u32, TRANSPARENT);
    for ((i, j), value) in shape.values.indexed_iter() {
        if let Some(frequency) = value {
            let row = (height - 1 - j) as u32;
            img.put_pixel(i as u32, row, frequency_color(*frequency));
        }
    }
    save(&img, path)
}
