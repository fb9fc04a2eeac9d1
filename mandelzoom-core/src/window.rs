use tracing::trace;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::scalar::{Precision, Scalar};

/// The rectangle of the complex plane mapped onto the output pixel grid.
///
/// Stores the target center and span, and caches the derived bounds
/// `center ± span / 2`. Every setter recomputes the bounds, so they are
/// always consistent with the center and span.
#[derive(Debug, Clone)]
pub struct RenderWindow<T> {
    precision: Precision,
    width_px: u32,
    height_px: u32,
    center: Complex<T>,
    span_re: T,
    span_im: T,
    re_min: T,
    re_max: T,
    im_min: T,
    im_max: T,
}

impl<T: Scalar> RenderWindow<T> {
    /// Create a window with an explicit center and span.
    pub fn new(
        precision: Precision,
        width_px: u32,
        height_px: u32,
        center: Complex<T>,
        span: (T, T),
    ) -> crate::Result<Self> {
        if width_px == 0 || height_px == 0 {
            return Err(CoreError::InvalidWindow {
                reason: format!("pixel dimensions must be > 0, got {width_px}×{height_px}"),
            });
        }
        validate_center(&center)?;
        validate_span(&span.0, &span.1)?;

        let zero = T::from_f64(0.0, &precision);
        let mut window = Self {
            precision,
            width_px,
            height_px,
            center,
            span_re: span.0,
            span_im: span.1,
            re_min: zero.clone(),
            re_max: zero.clone(),
            im_min: zero.clone(),
            im_max: zero,
        };
        window.update_bounds();
        trace!(
            width_px,
            height_px,
            bits = window.precision.bits(),
            center = ?window.center.to_f64(),
            "Render window created"
        );
        Ok(window)
    }

    /// Convenience constructor from `f64` center and span.
    pub fn from_f64(
        precision: Precision,
        width_px: u32,
        height_px: u32,
        center: (f64, f64),
        span: (f64, f64),
    ) -> crate::Result<Self> {
        let center = Complex::from_f64(center.0, center.1, &precision);
        let span = (
            T::from_f64(span.0, &precision),
            T::from_f64(span.1, &precision),
        );
        Self::new(precision, width_px, height_px, center, span)
    }

    /// Window whose imaginary span follows the pixel aspect ratio:
    /// `span_im = span_re · height_px / width_px`.
    pub fn with_aspect_span(
        precision: Precision,
        width_px: u32,
        height_px: u32,
        center: Complex<T>,
        span_re: T,
    ) -> crate::Result<Self> {
        if width_px == 0 || height_px == 0 {
            return Err(CoreError::InvalidWindow {
                reason: format!("pixel dimensions must be > 0, got {width_px}×{height_px}"),
            });
        }
        let span_im = span_re.clone() * T::from_f64(height_px as f64, &precision)
            / T::from_f64(width_px as f64, &precision);
        Self::new(precision, width_px, height_px, center, (span_re, span_im))
    }

    #[inline]
    pub fn precision(&self) -> &Precision {
        &self.precision
    }

    #[inline]
    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    #[inline]
    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    pub fn pixel_count(&self) -> usize {
        self.width_px as usize * self.height_px as usize
    }

    pub fn center(&self) -> &Complex<T> {
        &self.center
    }

    pub fn span(&self) -> (&T, &T) {
        (&self.span_re, &self.span_im)
    }

    /// `(re_min, re_max, im_min, im_max)`.
    pub fn bounds(&self) -> (&T, &T, &T, &T) {
        (&self.re_min, &self.re_max, &self.im_min, &self.im_max)
    }

    pub fn set_center(&mut self, center: Complex<T>) -> crate::Result<()> {
        validate_center(&center)?;
        self.center = center;
        self.update_bounds();
        Ok(())
    }

    pub fn set_span(&mut self, span_re: T, span_im: T) -> crate::Result<()> {
        validate_span(&span_re, &span_im)?;
        self.span_re = span_re;
        self.span_im = span_im;
        self.update_bounds();
        Ok(())
    }

    /// Same center, both spans multiplied by `factor`.
    pub fn zoomed(&self, factor: &T) -> crate::Result<Self> {
        let mut next = self.clone();
        next.set_span(
            self.span_re.clone() * factor.clone(),
            self.span_im.clone() * factor.clone(),
        )?;
        Ok(next)
    }

    /// Map pixel `(x, y)` to its complex-plane sample.
    ///
    /// The real part interpolates from `re_min` at `x = 0` toward `re_max`;
    /// the imaginary part runs the other way, from `im_max` at the top row
    /// toward `im_min`. The far edges (`x = width_px`, `y = height_px`) are
    /// never sampled.
    pub fn pixel_to_complex(&self, x: u32, y: u32) -> Complex<T> {
        let one = T::from_f64(1.0, &self.precision);
        let tx = T::from_f64(x as f64, &self.precision)
            / T::from_f64(self.width_px as f64, &self.precision);
        let ty = T::from_f64(y as f64, &self.precision)
            / T::from_f64(self.height_px as f64, &self.precision);

        let re = tx.clone() * self.re_max.clone() + (one.clone() - tx) * self.re_min.clone();
        let im = ty.clone() * self.im_min.clone() + (one - ty) * self.im_max.clone();
        Complex::new(re, im)
    }

    /// Whether one pixel step is still larger than the rounding unit of the
    /// bounds at the back-end's precision.
    ///
    /// When this is `false`, neighbouring pixels start to alias onto the same
    /// sample and the image degrades into blocks. Raising the precision is
    /// the caller's job; nothing in the kernel checks this.
    pub fn pixel_spacing_resolvable(&self) -> bool {
        // Stays in T: MPFR spans can sit far below the smallest f64.
        let p = &self.precision;
        let mut scale = T::from_f64(1.0, p);
        let mut remaining = self.center.re.significant_bits().saturating_sub(1);
        while remaining > 0 {
            let step = remaining.min(512);
            scale = scale * T::from_f64(2f64.powi(step as i32), p);
            remaining -= step;
        }

        let step_re = self.span_re.clone() / T::from_f64(self.width_px as f64, p);
        let step_im = self.span_im.clone() / T::from_f64(self.height_px as f64, p);
        step_re * scale.clone() > magnitude(&self.re_min, &self.re_max, p)
            && step_im * scale > magnitude(&self.im_min, &self.im_max, p)
    }

    fn update_bounds(&mut self) {
        let half = T::from_f64(0.5, &self.precision);
        let half_re = self.span_re.clone() * half.clone();
        let half_im = self.span_im.clone() * half;
        self.re_min = self.center.re.clone() - half_re.clone();
        self.re_max = self.center.re.clone() + half_re;
        self.im_min = self.center.im.clone() - half_im.clone();
        self.im_max = self.center.im.clone() + half_im;
    }
}

/// Larger absolute value of two bounds.
fn magnitude<T: Scalar>(lo: &T, hi: &T, precision: &Precision) -> T {
    let zero = T::from_f64(0.0, precision);
    let abs = |v: &T| if *v < zero { zero.clone() - v.clone() } else { v.clone() };
    let (a, b) = (abs(lo), abs(hi));
    if a > b { a } else { b }
}

fn validate_center<T: Scalar>(center: &Complex<T>) -> crate::Result<()> {
    if !center.re.is_finite() || !center.im.is_finite() {
        return Err(CoreError::InvalidWindow {
            reason: format!("center must be finite, got {:?}", center.to_f64()),
        });
    }
    Ok(())
}

fn validate_span<T: Scalar>(span_re: &T, span_im: &T) -> crate::Result<()> {
    let ok = |v: &T| v.is_positive() && v.is_finite();
    if !ok(span_re) || !ok(span_im) {
        return Err(CoreError::InvalidWindow {
            reason: format!(
                "span must be positive and finite, got {}×{}",
                span_re.to_f64(),
                span_im.to_f64()
            ),
        });
    }
    Ok(())
}
