use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::scalar::{Precision, Scalar};

/// A complex number over any [`Scalar`] back-end.
#[derive(Debug, Clone, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T: Scalar> Complex<T> {
    #[inline]
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }

    pub fn zero(precision: &Precision) -> Self {
        Self::new(T::from_f64(0.0, precision), T::from_f64(0.0, precision))
    }

    pub fn from_f64(re: f64, im: f64, precision: &Precision) -> Self {
        Self::new(T::from_f64(re, precision), T::from_f64(im, precision))
    }

    /// `re² + im²`, the squared magnitude.
    #[inline]
    pub fn norm_sq(&self) -> T {
        self.re.square() + self.im.square()
    }

    /// One Mandelbrot step, `self² + c`.
    ///
    /// `two` is passed in so arbitrary-precision back-ends do not allocate
    /// the constant on every call.
    #[inline]
    pub fn square_add(&self, c: &Self, two: &T) -> Self {
        let re = self.re.square() - self.im.square() + c.re.clone();
        let im = two.clone() * self.re.clone() * self.im.clone() + c.im.clone();
        Self { re, im }
    }

    /// Lossy downcast for diagnostics and tests.
    pub fn to_f64(&self) -> (f64, f64) {
        (self.re.to_f64(), self.im.to_f64())
    }
}

impl<T: Scalar> Add for Complex<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl<T: Scalar> Sub for Complex<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl<T: Scalar> Mul for Complex<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re.clone() * rhs.re.clone() - self.im.clone() * rhs.im.clone(),
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl<T: Scalar + fmt::Display> fmt::Display for Complex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}i", self.re, self.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DoubleDouble;

    const EPSILON: f64 = 1e-12;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn arithmetic() {
        let sum = c(1.0, 2.0) + c(3.0, 4.0);
        assert_eq!(sum, c(4.0, 6.0));
        let diff = c(5.0, 3.0) - c(2.0, 1.0);
        assert_eq!(diff, c(3.0, 2.0));
        // (1 + 2i)(3 + 4i) = -5 + 10i
        let prod = c(1.0, 2.0) * c(3.0, 4.0);
        assert!((prod.re + 5.0).abs() < EPSILON);
        assert!((prod.im - 10.0).abs() < EPSILON);
    }

    #[test]
    fn norm_sq() {
        assert!((c(3.0, 4.0).norm_sq() - 25.0).abs() < EPSILON);
    }

    #[test]
    fn square_add_matches_mul() {
        let z = c(0.5, 0.5);
        let k = c(-0.75, 0.1);
        let step = z.square_add(&k, &2.0);
        let expected = z.clone() * z + k;
        assert!((step.re - expected.re).abs() < EPSILON);
        assert!((step.im - expected.im).abs() < EPSILON);
        // (0.5 + 0.5i)² + (-0.75 + 0.1i) = -0.75 + 0.6i
        assert!((step.re + 0.75).abs() < EPSILON);
        assert!((step.im - 0.6).abs() < EPSILON);
    }

    #[test]
    fn generic_over_double_double() {
        let p = Precision::default();
        let z: Complex<DoubleDouble> = Complex::from_f64(1.0, 1.0, &p);
        let two = DoubleDouble::from(2.0);
        let step = z.square_add(&Complex::zero(&p), &two);
        assert_eq!(step.to_f64(), (0.0, 2.0));
    }
}
