use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::CoreError;
use crate::scalar::{Precision, Scalar};

/// A double-double real: the unevaluated sum `hi + lo` of two `f64`s.
///
/// Carries ~106 significant bits (~31 decimal digits), enough for zooms
/// roughly 10¹⁵ times deeper than plain `f64` before adjacent pixels alias.
/// The invariant `|lo| ≤ ulp(hi) / 2` is maintained by every operation.
///
/// Arithmetic follows Hida, Li & Bailey, "Library for Double-Double and
/// Quad-Double Arithmetic" (2001).
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleDouble {
    pub hi: f64,
    pub lo: f64,
}

/// Error-free sum: `s + e == a + b` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    (s, (a - (s - bb)) + (b - bb))
}

/// Error-free sum assuming `|a| >= |b|`.
#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    (s, b - (s - a))
}

/// Error-free product via fused multiply-add.
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

/// Largest power of ten applied in one division while parsing.
const MAX_POW10_STEP: u32 = 300;

impl DoubleDouble {
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };
    pub const ONE: Self = Self { hi: 1.0, lo: 0.0 };

    #[inline]
    pub fn new(hi: f64, lo: f64) -> Self {
        let (hi, lo) = two_sum(hi, lo);
        Self { hi, lo }
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.hi + self.lo
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0)
    }

    /// `10ⁿ` by repeated squaring.
    fn pow10(mut n: u32) -> Self {
        let mut result = Self::ONE;
        let mut base = Self::from(10.0);
        while n > 0 {
            if n & 1 == 1 {
                result = result * base;
            }
            n >>= 1;
            if n > 0 {
                base = base * base;
            }
        }
        result
    }

    /// Parse a plain decimal literal with an optional sign, fraction and
    /// exponent. Digits are accumulated in double-double so that literals
    /// longer than 17 significant digits keep their tail.
    fn parse_decimal(input: &str) -> Option<Self> {
        let s = input.trim();
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match body.find(|c| c == 'e' || c == 'E') {
            Some(i) => (&body[..i], body[i + 1..].parse::<i32>().ok()?),
            None => (body, 0),
        };

        let mut value = Self::ZERO;
        let mut digits = 0u32;
        let mut fraction_digits = 0i32;
        let mut seen_point = false;
        for ch in mantissa.chars() {
            match ch {
                '0'..='9' => {
                    let d = ch as u32 - '0' as u32;
                    value = value * 10.0 + Self::from(d as f64);
                    digits += 1;
                    if seen_point {
                        fraction_digits += 1;
                    }
                }
                '.' if !seen_point => seen_point = true,
                _ => return None,
            }
        }
        if digits == 0 {
            return None;
        }

        let scale = exponent.checked_sub(fraction_digits)?;
        let value = if scale >= 0 {
            value * Self::pow10(scale.unsigned_abs())
        } else {
            // 10^n overflows f64 past n = 308, so scale down in bounded steps.
            let mut value = value;
            let mut remaining = scale.unsigned_abs();
            while remaining > 0 && value.hi != 0.0 {
                let step = remaining.min(MAX_POW10_STEP);
                value = value / Self::pow10(step);
                remaining -= step;
            }
            value
        };
        Some(if negative { -value } else { value })
    }
}

impl From<f64> for DoubleDouble {
    #[inline]
    fn from(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }
}

impl Add for DoubleDouble {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s, e) = two_sum(self.hi, rhs.hi);
        let (t, f) = two_sum(self.lo, rhs.lo);
        let (s, e) = quick_two_sum(s, e + t);
        let (hi, lo) = quick_two_sum(s, e + f);
        Self { hi, lo }
    }
}

impl AddAssign for DoubleDouble {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl SubAssign for DoubleDouble {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p, e) = two_prod(self.hi, rhs.hi);
        let e = e + (self.hi * rhs.lo + self.lo * rhs.hi);
        let (hi, lo) = quick_two_sum(p, e);
        Self { hi, lo }
    }
}

impl MulAssign for DoubleDouble {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<f64> for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        let (p, e) = two_prod(self.hi, rhs);
        let (hi, lo) = quick_two_sum(p, e + self.lo * rhs);
        Self { hi, lo }
    }
}

/// Long division with two correction steps.
impl Div for DoubleDouble {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let q1 = self.hi / rhs.hi;
        let r = self - rhs * q1;
        let q2 = r.hi / rhs.hi;
        let r = r - rhs * q2;
        let q3 = r.hi / rhs.hi;
        let (hi, lo) = quick_two_sum(q1, q2);
        Self { hi, lo } + Self::from(q3)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl PartialEq for DoubleDouble {
    fn eq(&self, other: &Self) -> bool {
        self.hi == other.hi && self.lo == other.lo
    }
}

impl PartialOrd for DoubleDouble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.hi.partial_cmp(&other.hi) {
            Some(Ordering::Equal) => self.lo.partial_cmp(&other.lo),
            ord => ord,
        }
    }
}

impl fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+.17e} {:+.17e})", self.hi, self.lo)
    }
}

impl Scalar for DoubleDouble {
    #[inline]
    fn from_f64(value: f64, _precision: &Precision) -> Self {
        Self::from(value)
    }

    fn parse(input: &str, _precision: &Precision) -> crate::Result<Self> {
        Self::parse_decimal(input).ok_or_else(|| CoreError::InvalidNumber {
            input: input.to_string(),
        })
    }

    #[inline]
    fn to_f64(&self) -> f64 {
        DoubleDouble::to_f64(*self)
    }

    #[inline]
    fn significant_bits(&self) -> u32 {
        2 * f64::MANTISSA_DIGITS
    }

    #[inline]
    fn is_positive(&self) -> bool {
        self.hi > 0.0 || (self.hi == 0.0 && self.lo > 0.0)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.hi.is_finite() && self.lo.is_finite()
    }

    #[inline]
    fn square(&self) -> Self {
        let (p, e) = two_prod(self.hi, self.hi);
        let e = e + 2.0 * self.hi * self.lo;
        let (hi, lo) = quick_two_sum(p, e);
        Self { hi, lo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dd(v: f64) -> DoubleDouble {
        DoubleDouble::from(v)
    }

    fn close(a: DoubleDouble, b: DoubleDouble, eps: f64) -> bool {
        (a - b).abs().hi < eps
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!((dd(1.0) + dd(2.0)).to_f64(), 3.0);
        assert_eq!((dd(5.0) - dd(3.0)).to_f64(), 2.0);
        assert_eq!((dd(3.0) * dd(4.0)).to_f64(), 12.0);
        assert_eq!((dd(2.5) * 4.0).to_f64(), 10.0);
        assert_eq!((dd(10.0) / dd(4.0)).to_f64(), 2.5);
        assert_eq!(-dd(7.0), dd(-7.0));
    }

    #[test]
    fn compound_assignment() {
        let mut a = dd(1.0);
        a += dd(2.0);
        a *= dd(4.0);
        a -= dd(2.0);
        assert_eq!(a.to_f64(), 10.0);
    }

    #[test]
    fn keeps_small_addend() {
        // 1 + 1e-17 == 1 in f64; double-double keeps the tail in `lo`.
        let sum = dd(1.0) + dd(1e-17);
        let diff = sum - dd(1.0);
        assert!((diff.to_f64() - 1e-17).abs() < 1e-32);
    }

    #[test]
    fn division_is_accurate() {
        let third = dd(1.0) / dd(3.0);
        assert!(close(third * dd(3.0), DoubleDouble::ONE, 1e-31));
        assert!(third.lo != 0.0, "1/3 needs the low word");
    }

    #[test]
    fn square_matches_mul() {
        let a = DoubleDouble::new(1.0, 1e-16);
        assert!(close(Scalar::square(&a), a * a, 1e-31));
    }

    #[test]
    fn ordering_uses_low_word() {
        assert!(DoubleDouble::new(1.0, 1e-17) > dd(1.0));
        assert!(dd(-1.0) < dd(1.0));
    }

    #[test]
    fn parse_keeps_extra_digits() {
        let p = Precision::default();
        let tenth = <DoubleDouble as Scalar>::parse("0.1", &p).unwrap();
        // The f64 0.1 is off by ~5.5e-18; the parsed value is exact to ~1e-33.
        assert!(close(tenth * dd(10.0), DoubleDouble::ONE, 1e-31));
        assert!(!close(dd(0.1) * dd(10.0), DoubleDouble::ONE, 1e-31));
    }

    #[test]
    fn parse_formats() {
        let p = Precision::default();
        let parse = |s: &str| <DoubleDouble as Scalar>::parse(s, &p);
        assert_eq!(parse("-2").unwrap().to_f64(), -2.0);
        assert_eq!(parse("+4.5e2").unwrap().to_f64(), 450.0);
        assert_eq!(parse("125E-3").unwrap().to_f64(), 0.125);
        assert_eq!(parse(".5").unwrap().to_f64(), 0.5);
        assert!(parse("").is_err());
        assert!(parse("1.2.3").is_err());
        assert!(parse("1e").is_err());
        assert!(parse("0x10").is_err());
    }

    #[test]
    fn parse_underflows_to_zero_not_nan() {
        let p = Precision::default();
        let parse = |s: &str| <DoubleDouble as Scalar>::parse(s, &p).unwrap();

        let tiny = parse("1e-400");
        assert!(Scalar::is_finite(&tiny));
        assert_eq!(tiny.to_f64(), 0.0);

        let sub = parse("0.000000000000000000001e-300");
        assert!(Scalar::is_finite(&sub));
        assert!(sub.to_f64() > 0.0 && sub.to_f64() < 1e-320);

        let long = format!("0.{}5", "0".repeat(320));
        let v = parse(&long);
        assert!(Scalar::is_finite(&v));
        assert!(v.to_f64() > 0.0 && v.to_f64() < 1e-320);

        assert_eq!(parse("-3e-500").to_f64(), 0.0);
    }

    #[test]
    fn parse_long_literal() {
        let p = Precision::default();
        let re = <DoubleDouble as Scalar>::parse("-1.26222162762384535370226702572022420406", &p)
            .unwrap();
        let plain: f64 = "-1.26222162762384535370226702572022420406".parse().unwrap();
        assert!((re.hi - plain).abs() <= f64::EPSILON * 2.0);
        assert!(re.lo != 0.0);
    }
}
