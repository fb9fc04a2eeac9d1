use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of escape-time iterations per pixel.
///
/// A pixel that survives this many steps is presumed to lie inside the
/// set. Counts produced under a budget always fall in `0..=budget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IterationBudget(u32);

impl IterationBudget {
    pub const DEFAULT: u32 = 300;
    pub const DEFAULT_HARD_CAP: u32 = 30_000;

    pub fn new(max_iterations: u32) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidBudget(max_iterations));
        }
        Ok(Self(max_iterations))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Budget for a zoom frame: `min(initial + 10^log10(zoom_ratio), hard_cap)`.
    ///
    /// The exponent and logarithm cancel, so the budget grows linearly with
    /// the zoom ratio. The result is truncated toward zero and never drops
    /// below one.
    pub fn adaptive(initial: Self, zoom_ratio: f64, hard_cap: Self) -> Self {
        let grown = initial.0 as f64 + 10f64.powf(zoom_ratio.log10());
        let capped = grown.min(hard_cap.0 as f64);
        Self(capped.max(1.0) as u32)
    }
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u32> for IterationBudget {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IterationBudget> for u32 {
    fn from(b: IterationBudget) -> Self {
        b.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(n: u32) -> IterationBudget {
        IterationBudget::new(n).unwrap()
    }

    #[test]
    fn rejects_zero() {
        assert!(IterationBudget::new(0).is_err());
        assert_eq!(budget(1).get(), 1);
        assert_eq!(IterationBudget::default().get(), 300);
    }

    #[test]
    fn adaptive_at_unit_zoom() {
        assert_eq!(IterationBudget::adaptive(budget(300), 1.0, budget(30_000)).get(), 301);
    }

    #[test]
    fn adaptive_grows_with_zoom_ratio() {
        let b = IterationBudget::adaptive(budget(300), 1000.0, budget(30_000));
        // 10^log10(1000) may land a hair under 1000 before truncation.
        assert!((1299..=1300).contains(&b.get()), "got {}", b.get());
    }

    #[test]
    fn adaptive_is_capped() {
        let b = IterationBudget::adaptive(budget(300), 1e9, budget(30_000));
        assert_eq!(b.get(), 30_000);
    }

    #[test]
    fn adaptive_is_monotonic_in_zoom() {
        let cap = budget(30_000);
        let mut last = 0;
        for ratio in [1.0, 1.5, 10.0, 150.0, 4096.0, 1e6] {
            let b = IterationBudget::adaptive(budget(300), ratio, cap).get();
            assert!(b >= last);
            last = b;
        }
    }

    #[test]
    fn serde_validates() {
        let b: IterationBudget = serde_json::from_str("500").unwrap();
        assert_eq!(b.get(), 500);
        assert!(serde_json::from_str::<IterationBudget>("0").is_err());
    }
}
