use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Bits of significance requested for scalar arithmetic.
///
/// A `Precision` is built once before a render and passed by reference to
/// every scalar constructor, so no numeric state is global. Fixed-width
/// back-ends (`f64`, [`DoubleDouble`](crate::DoubleDouble)) ignore it; the
/// MPFR back-end allocates every value at exactly this many bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Precision {
    bits: u32,
}

impl Precision {
    pub const MIN_BITS: u32 = 2;
    pub const DEFAULT_BITS: u32 = 64;

    pub fn new(bits: u32) -> crate::Result<Self> {
        if bits < Self::MIN_BITS {
            return Err(CoreError::InvalidPrecision(bits));
        }
        Ok(Self { bits })
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.bits
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            bits: Self::DEFAULT_BITS,
        }
    }
}

impl TryFrom<u32> for Precision {
    type Error = CoreError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<Precision> for u32 {
    fn from(p: Precision) -> Self {
        p.bits
    }
}

/// Real number type the mapper and escape-time kernel are generic over.
///
/// Arithmetic is by value so that heap-backed types (MPFR floats) fit the
/// same bounds as `Copy` floats; implementations may override
/// [`square`](Self::square) with a cheaper in-place form.
pub trait Scalar:
    Clone
    + Debug
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Build a value from an `f64` at the given precision.
    fn from_f64(value: f64, precision: &Precision) -> Self;

    /// Parse a decimal literal (`-1.25`, `4.5e-3`) at the given precision.
    ///
    /// Unlike [`from_f64`](Self::from_f64) this keeps every digit the
    /// back-end can represent.
    fn parse(input: &str, precision: &Precision) -> crate::Result<Self>;

    /// Nearest `f64` (may lose low-order bits).
    fn to_f64(&self) -> f64;

    /// Number of significant mantissa bits this value carries.
    fn significant_bits(&self) -> u32;

    fn is_positive(&self) -> bool;

    fn is_finite(&self) -> bool;

    #[inline]
    fn square(&self) -> Self {
        self.clone() * self.clone()
    }
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(value: f64, _precision: &Precision) -> Self {
        value
    }

    fn parse(input: &str, _precision: &Precision) -> crate::Result<Self> {
        input
            .trim()
            .parse::<f64>()
            .map_err(|_| CoreError::InvalidNumber {
                input: input.to_string(),
            })
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        *self
    }

    #[inline]
    fn significant_bits(&self) -> u32 {
        f64::MANTISSA_DIGITS
    }

    #[inline]
    fn is_positive(&self) -> bool {
        *self > 0.0
    }

    #[inline]
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    #[inline]
    fn square(&self) -> Self {
        self * self
    }
}
