//! Histogram equalization of escape counts.
//!
//! The three tables are all indexed by count in `[0, budget]`, so each has
//! `budget + 1` entries.

use rayon::prelude::*;

use crate::count_grid::CountGrid;

/// Pixels per worker partition when tallying. Each partition fills its own
/// histogram; the partial histograms are summed once at the end.
const CHUNK: usize = 4096;

/// Number of pixels at each escape count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u64>,
}

impl Histogram {
    pub fn from_counts(grid: &CountGrid) -> Self {
        let size = grid.budget().get() as usize + 1;
        let partials: Vec<Vec<u64>> = grid
            .data()
            .par_chunks(CHUNK)
            .fold(
                || vec![0u64; size],
                |mut local, chunk| {
                    for &n in chunk {
                        local[n as usize] += 1;
                    }
                    local
                },
            )
            .collect();

        let mut bins = vec![0u64; size];
        for local in partials {
            for (acc, v) in bins.iter_mut().zip(local) {
                *acc += v;
            }
        }
        Self { bins }
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Running sum: `cdf[0] = hist[0]`, `cdf[i] = cdf[i − 1] + hist[i]`.
    pub fn cdf(&self) -> Cdf {
        let values = self
            .bins
            .iter()
            .scan(0u64, |acc, &h| {
                *acc += h;
                Some(*acc)
            })
            .collect();
        Cdf { values }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cdf {
    values: Vec<u64>,
}

impl Cdf {
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// The last entry, i.e. the pixel count of the grid.
    pub fn total(&self) -> u64 {
        self.values.last().copied().unwrap_or(0)
    }

    pub fn brightness_table(&self) -> BrightnessTable {
        let total = self.total();
        let values = if total == 0 {
            vec![0.0; self.values.len()]
        } else {
            self.values
                .iter()
                .map(|&v| v as f64 / total as f64)
                .collect()
        };
        BrightnessTable { values }
    }
}

/// `cdf[i] / cdf[budget]`: values in `[0, 1]`, non-decreasing in `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessTable {
    values: Vec<f64>,
}

impl BrightnessTable {
    /// Histogram, CDF and normalization in one call.
    pub fn from_counts(grid: &CountGrid) -> Self {
        Histogram::from_counts(grid).cdf().brightness_table()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, count: u32) -> Option<f64> {
        self.values.get(count as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandelzoom_core::IterationBudget;

    fn grid(budget: u32, data: Vec<u32>) -> CountGrid {
        let len = data.len() as u32;
        CountGrid::new(len, 1, IterationBudget::new(budget).unwrap(), data).unwrap()
    }

    #[test]
    fn tallies_each_count() {
        let h = Histogram::from_counts(&grid(4, vec![0, 1, 1, 4, 4, 4]));
        assert_eq!(h.bins(), &[1, 2, 0, 0, 3]);
        assert_eq!(h.total(), 6);
    }

    #[test]
    fn merge_across_partitions() {
        let data: Vec<u32> = (0..10_000).map(|i| i % 7).collect();
        let h = Histogram::from_counts(&grid(6, data));
        let mut expected = [0u64; 7];
        for i in 0..10_000u32 {
            expected[(i % 7) as usize] += 1;
        }
        assert_eq!(h.bins(), &expected);
    }

    #[test]
    fn cdf_is_running_sum() {
        let cdf = Histogram::from_counts(&grid(4, vec![0, 1, 1, 4, 4, 4])).cdf();
        assert_eq!(cdf.values(), &[1, 3, 3, 3, 6]);
        assert_eq!(cdf.total(), 6);
    }

    #[test]
    fn brightness_normalized() {
        let table = BrightnessTable::from_counts(&grid(4, vec![0, 1, 1, 4, 4, 4]));
        assert_eq!(table.values(), &[1.0 / 6.0, 0.5, 0.5, 0.5, 1.0]);
        assert_eq!(table.get(4), Some(1.0));
        assert_eq!(table.get(5), None);
    }

    #[test]
    fn empty_grid_gives_zero_table() {
        let g = CountGrid::new(0, 0, IterationBudget::new(3).unwrap(), Vec::new()).unwrap();
        let table = BrightnessTable::from_counts(&g);
        assert_eq!(table.values(), &[0.0; 4]);
    }
}
