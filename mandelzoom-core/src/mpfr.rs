//! Arbitrary-precision scalars backed by MPFR (`rug::Float`).
//!
//! Every value is allocated at the bit width of the [`Precision`] it was
//! built with; results of arithmetic inherit the left operand's width, so a
//! render stays at one precision as long as all its inputs came from the
//! same context.

use std::cmp::Ordering;

pub use rug::Float;

use crate::error::CoreError;
use crate::scalar::{Precision, Scalar};

impl Scalar for Float {
    #[inline]
    fn from_f64(value: f64, precision: &Precision) -> Self {
        Float::with_val(precision.bits(), value)
    }

    fn parse(input: &str, precision: &Precision) -> crate::Result<Self> {
        let parsed = Float::parse(input.trim()).map_err(|_| CoreError::InvalidNumber {
            input: input.to_string(),
        })?;
        Ok(Float::with_val(precision.bits(), parsed))
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        Float::to_f64(self)
    }

    #[inline]
    fn significant_bits(&self) -> u32 {
        self.prec()
    }

    #[inline]
    fn is_positive(&self) -> bool {
        self.cmp0() == Some(Ordering::Greater)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        Float::is_finite(self)
    }

    #[inline]
    fn square(&self) -> Self {
        Float::with_val(self.prec(), self.square_ref())
    }
}
