use crate::budget::IterationBudget;
use crate::complex::Complex;
use crate::scalar::{Precision, Scalar};

/// Escape-time kernel for `z ← z² + c`, starting from `z = 0`.
///
/// Holds the loop constants at the caller's precision so that the hot loop
/// allocates nothing beyond the orbit itself. The engine is read-only and
/// `Sync`, so one instance is shared by every worker of a parallel render.
#[derive(Debug, Clone)]
pub struct EscapeTimeEngine<T> {
    budget: IterationBudget,
    two: T,
    /// `|z|² > 4` is the same test as `|z| > 2` without a square root.
    bailout_sq: T,
}

impl<T: Scalar> EscapeTimeEngine<T> {
    pub fn new(budget: IterationBudget, precision: &Precision) -> Self {
        Self {
            budget,
            two: T::from_f64(2.0, precision),
            bailout_sq: T::from_f64(4.0, precision),
        }
    }

    #[inline]
    pub fn budget(&self) -> IterationBudget {
        self.budget
    }

    /// Number of steps `c` survives before `|z|` exceeds 2.
    ///
    /// Each step computes `z ← z² + c` and then tests the magnitude; the
    /// return value counts the steps that did not escape. A sample with
    /// `|c| > 2` therefore returns 0, and one that never escapes returns the
    /// budget.
    pub fn count(&self, c: &Complex<T>) -> u32 {
        let max = self.budget.get();
        let mut z = Complex::new(c.re.clone(), c.im.clone());
        let mut n = 0;
        while n < max {
            if z.norm_sq() > self.bailout_sq {
                break;
            }
            z = z.square_add(c, &self.two);
            n += 1;
        }
        n
    }
}
