use mandelzoom_core::IterationBudget;

use crate::error::RenderError;

/// Per-pixel escape counts for one frame, row-major.
///
/// Every entry lies in `[0, budget]`; a value equal to the budget means the
/// sample never escaped. Keeping counts apart from colors lets the same grid
/// be colorized with different palettes and policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountGrid {
    width: u32,
    height: u32,
    budget: IterationBudget,
    data: Vec<u32>,
}

impl CountGrid {
    /// Wrap existing counts. Values above the budget are clamped to it.
    pub fn new(
        width: u32,
        height: u32,
        budget: IterationBudget,
        mut data: Vec<u32>,
    ) -> crate::Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(RenderError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        let max = budget.get();
        for n in &mut data {
            *n = (*n).min(max);
        }
        Ok(Self::from_parts(width, height, budget, data))
    }

    /// Caller guarantees `data.len() == width * height` and every count is
    /// within the budget.
    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        budget: IterationBudget,
        data: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            budget,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn budget(&self) -> IterationBudget {
        self.budget
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn max_count(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Share of pixels whose count is below the budget.
    pub fn escaped_fraction(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let max = self.budget.get();
        let escaped = self.data.iter().filter(|&&n| n < max).count();
        escaped as f64 / self.data.len() as f64
    }

    /// Central-difference gradient magnitude of the count field.
    ///
    /// Only interior pixels have both neighbours, so the result holds
    /// `(width − 2) · (height − 2)` values in row-major order, and is empty
    /// when either dimension is below 3.
    pub fn gradient_magnitude(&self) -> Vec<f64> {
        let (w, h) = (self.width as usize, self.height as usize);
        if w < 3 || h < 3 {
            return Vec::new();
        }
        let at = |x: usize, y: usize| self.data[y * w + x] as f64;
        let mut mag = Vec::with_capacity((w - 2) * (h - 2));
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let dx = at(x + 1, y) - at(x - 1, y);
                let dy = at(x, y + 1) - at(x, y - 1);
                mag.push(dx.hypot(dy));
            }
        }
        mag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(n: u32) -> IterationBudget {
        IterationBudget::new(n).unwrap()
    }

    #[test]
    fn rejects_wrong_length() {
        let err = CountGrid::new(3, 2, budget(10), vec![0; 5]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::DimensionMismatch { expected: 6, actual: 5 }
        ));
    }

    #[test]
    fn clamps_to_budget() {
        let g = CountGrid::new(2, 1, budget(10), vec![3, 99]).unwrap();
        assert_eq!(g.data(), &[3, 10]);
        assert_eq!(g.max_count(), 10);
    }

    #[test]
    fn get_is_row_major() {
        let g = CountGrid::new(3, 2, budget(10), vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(g.get(0, 0), Some(0));
        assert_eq!(g.get(2, 0), Some(2));
        assert_eq!(g.get(0, 1), Some(3));
        assert_eq!(g.get(3, 0), None);
        assert_eq!(g.get(0, 2), None);
    }

    #[test]
    fn escaped_fraction_counts_below_budget() {
        let g = CountGrid::new(2, 2, budget(5), vec![5, 1, 5, 0]).unwrap();
        assert_eq!(g.escaped_fraction(), 0.5);
    }

    #[test]
    fn gradient_of_ramp() {
        // Counts increase by 1 per column and 3 per row.
        let data: Vec<u32> = (0..9).collect();
        let g = CountGrid::new(3, 3, budget(100), data).unwrap();
        let mag = g.gradient_magnitude();
        assert_eq!(mag.len(), 1);
        assert!((mag[0] - (4.0f64 + 36.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn gradient_size_and_flat_field() {
        let g = CountGrid::new(5, 4, budget(10), vec![7; 20]).unwrap();
        let mag = g.gradient_magnitude();
        assert_eq!(mag.len(), 3 * 2);
        assert!(mag.iter().all(|&m| m == 0.0));
        let thin = CountGrid::new(2, 4, budget(10), vec![0; 8]).unwrap();
        assert!(thin.gradient_magnitude().is_empty());
    }
}
