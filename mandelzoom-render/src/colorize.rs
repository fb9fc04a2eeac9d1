use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::color_grid::ColorGrid;
use crate::count_grid::CountGrid;
use crate::error::RenderError;
use crate::histogram::BrightnessTable;
use crate::palette::Palette;

/// Color for samples that used up the whole budget under the equalized policy.
pub const INTERIOR_COLOR: Color = Color::BLACK;

/// How an escape count picks a palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorPolicy {
    /// Equal-width count buckets, one per palette entry.
    LinearBucket,
    /// Palette position follows the count's rank in the frame's distribution.
    #[default]
    Equalized,
}

/// Map every count in `grid` to a color.
///
/// The equalized policy builds its brightness table from `grid` itself.
pub fn colorize(
    grid: &CountGrid,
    palette: &Palette,
    policy: ColorPolicy,
) -> crate::Result<ColorGrid> {
    ensure_palette(palette)?;
    match policy {
        ColorPolicy::LinearBucket => {
            let budget = grid.budget().get();
            Ok(map_pixels(grid, |n| linear_bucket_color(n, budget, palette)))
        }
        ColorPolicy::Equalized => {
            let table = BrightnessTable::from_counts(grid);
            colorize_with_table(grid, palette, &table)
        }
    }
}

/// Equalized coloring against a precomputed table, which must have one
/// entry per count in `[0, budget]`.
pub fn colorize_with_table(
    grid: &CountGrid,
    palette: &Palette,
    table: &BrightnessTable,
) -> crate::Result<ColorGrid> {
    ensure_palette(palette)?;
    let budget = grid.budget().get();
    let expected = budget as usize + 1;
    if table.len() != expected {
        return Err(RenderError::DimensionMismatch {
            expected,
            actual: table.len(),
        });
    }
    Ok(map_pixels(grid, |n| equalized_color(n, budget, table, palette)))
}

/// Bucket lookup with `step = budget / len` (integer division).
///
/// Bucket `i` covers `step·i ..= step·(i + 1)`, so adjacent buckets share
/// their boundary and the lower one wins. Counts past the last bucket get the
/// last color. With `step == 0` only a count of 0 lands in a bucket.
///
/// `palette` must not be empty.
pub fn linear_bucket_color(n: u32, budget: u32, palette: &Palette) -> Color {
    let colors = palette.colors();
    let last = colors.len().saturating_sub(1);
    let step = budget as usize / colors.len().max(1);
    let n = n as usize;
    let index = if step == 0 {
        if n == 0 {
            0
        } else {
            last
        }
    } else if n > 0 && n % step == 0 {
        n / step - 1
    } else {
        n / step
    };
    colors
        .get(index.min(last))
        .copied()
        .unwrap_or(INTERIOR_COLOR)
}

/// `palette[floor(table[n] · (len − 1))]`, or [`INTERIOR_COLOR`] once `n`
/// reaches the budget.
pub fn equalized_color(n: u32, budget: u32, table: &BrightnessTable, palette: &Palette) -> Color {
    if n >= budget {
        return INTERIOR_COLOR;
    }
    let colors = palette.colors();
    let last = colors.len().saturating_sub(1);
    let brightness = table.get(n).unwrap_or(0.0);
    let index = ((brightness * last as f64) as usize).min(last);
    colors.get(index).copied().unwrap_or(INTERIOR_COLOR)
}

fn ensure_palette(palette: &Palette) -> crate::Result<()> {
    if palette.is_empty() {
        return Err(RenderError::EmptyPalette);
    }
    Ok(())
}

fn map_pixels(grid: &CountGrid, f: impl Fn(u32) -> Color + Sync) -> ColorGrid {
    let start = Instant::now();
    let pixels: Vec<Color> = grid.data().par_iter().map(|&n| f(n)).collect();
    debug!(
        elapsed_ms = start.elapsed().as_millis(),
        pixels = pixels.len(),
        "Colorized"
    );
    ColorGrid::from_counts_shape(grid, pixels)
}
