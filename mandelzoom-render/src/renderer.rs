use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use mandelzoom_core::{EscapeTimeEngine, IterationBudget, RenderWindow, Scalar};

use crate::count_grid::CountGrid;

/// Escape counts for every pixel of `window`.
///
/// Rows are handed to rayon's pool independently; each worker writes only
/// its own slice of the output, so there is no shared mutable state during
/// the parallel phase.
pub fn compute_counts<T: Scalar>(window: &RenderWindow<T>, budget: IterationBudget) -> CountGrid {
    let start = Instant::now();
    let engine = EscapeTimeEngine::new(budget, window.precision());
    let width = window.width_px();
    let height = window.height_px();

    let mut data = vec![0u32; window.pixel_count()];
    data.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, slot) in row.iter_mut().enumerate() {
                let c = window.pixel_to_complex(x as u32, y as u32);
                *slot = engine.count(&c);
            }
        });

    debug!(
        elapsed_ms = start.elapsed().as_millis(),
        width,
        height,
        budget = budget.get(),
        "Counts computed"
    );
    CountGrid::from_parts(width, height, budget, data)
}
