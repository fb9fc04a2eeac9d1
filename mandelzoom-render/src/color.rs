use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use crate::error::RenderError;

/// An 8-bit RGB color.
///
/// Channels are stored as `u8`, so every value is inside `[0, 255]` by
/// construction; operations that can overshoot compute in a wider type and
/// clamp. Ordering is lexicographic on `(r, g, b)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

#[inline]
fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from unbounded channel values, clamping each to `[0, 255]`.
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    #[inline]
    pub fn r(self) -> u8 {
        self.r
    }

    #[inline]
    pub fn g(self) -> u8 {
        self.g
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.b
    }

    #[inline]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn set_r(&mut self, r: i32) {
        self.r = clamp_channel(r);
    }

    pub fn set_g(&mut self, g: i32) {
        self.g = clamp_channel(g);
    }

    pub fn set_b(&mut self, b: i32) {
        self.b = clamp_channel(b);
    }

    pub fn set_rgb(&mut self, r: i32, g: i32, b: i32) {
        *self = Self::clamped(r, g, b);
    }

    pub fn invert(self) -> Self {
        Self::rgb(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Rec. 601 luma, rounded to the nearest integer.
    pub fn grayscale(self) -> u8 {
        let y = 0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64;
        y.round() as u8
    }

    /// The gray with this color's [`grayscale`](Self::grayscale) value.
    pub fn to_grayscale(self) -> Self {
        let y = self.grayscale();
        Self::rgb(y, y, y)
    }

    /// Rec. 709 relative luminance on the 0–255 scale (not clamped or rounded).
    pub fn luminance(self) -> f64 {
        0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64
    }

    /// Scale each channel toward 0 by `factor` (0 = unchanged, 1 = black).
    pub fn darken(self, factor: f64) -> Self {
        let f = |v: u8| (v as f64 * (1.0 - factor)) as i32;
        Self::clamped(f(self.r), f(self.g), f(self.b))
    }

    /// Scale each channel toward 255 by `factor` (0 = unchanged, 1 = white).
    pub fn lighten(self, factor: f64) -> Self {
        let f = |v: u8| (v as f64 + (255.0 - v as f64) * factor) as i32;
        Self::clamped(f(self.r), f(self.g), f(self.b))
    }

    /// Linear interpolation toward `other`; `t` is clamped to `[0, 1]`.
    pub fn blend(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv = 1.0 - t;
        let mix = |a: u8, b: u8| (a as f64 * inv + b as f64 * t) as i32;
        Self::clamped(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Hue-sector HSV → RGB. Hues outside `[0, 360)` wrap around.
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.rem_euclid(360.0);
        let chroma = v * s;
        let x = chroma * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = v - chroma;

        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let to_channel = |c: f64| ((c + m) * 255.0) as i32;
        Self::clamped(to_channel(r), to_channel(g), to_channel(b))
    }

    /// RGB → HSV. Achromatic colors (max == min) report hue 0.
    pub fn to_hsv(self) -> Hsv {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let mut h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta) % 6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        if h < 0.0 {
            h += 360.0;
        }
        let s = if max == 0.0 { 0.0 } else { delta / max };
        Hsv { h, s, v: max }
    }

    /// Parse `#RRGGBB` (hex digits in either case).
    pub fn from_hex(hex: &str) -> crate::Result<Self> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| RenderError::format(hex, "expected a leading '#'"))?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RenderError::format(hex, "expected exactly six hex digits"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| RenderError::format(hex, e.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#RRGGBB` with uppercase hex digits.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::clamped(
            self.r as i32 + rhs.r as i32,
            self.g as i32 + rhs.g as i32,
            self.b as i32 + rhs.b as i32,
        )
    }
}

impl Sub for Color {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::clamped(
            self.r as i32 - rhs.r as i32,
            self.g as i32 - rhs.g as i32,
            self.b as i32 - rhs.b as i32,
        )
    }
}

impl Mul<f64> for Color {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        let f = |v: u8| (v as f64 * factor) as i32;
        Self::clamped(f(self.r), f(self.g), f(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Accepts `(r, g, b)` or `RGB(r, g, b)`; values are clamped to `[0, 255]`.
impl FromStr for Color {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = match trimmed.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("rgb") => trimmed[3..].trim_start(),
            _ => trimmed,
        };
        let inner = body
            .strip_prefix('(')
            .and_then(|b| b.strip_suffix(')'))
            .ok_or_else(|| RenderError::format(s, "expected \"(R, G, B)\""))?;

        let mut channels = [0i32; 3];
        let mut parts = inner.split(',');
        for slot in channels.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| RenderError::format(s, "expected three channels"))?;
            *slot = part
                .trim()
                .parse()
                .map_err(|_| RenderError::format(s, format!("bad channel {:?}", part.trim())))?;
        }
        if parts.next().is_some() {
            return Err(RenderError::format(s, "expected three channels"));
        }
        Ok(Self::clamped(channels[0], channels[1], channels[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp() {
        let mut c = Color::BLACK;
        c.set_r(300);
        c.set_g(-5);
        c.set_b(128);
        assert_eq!(c, Color::rgb(255, 0, 128));
        c.set_rgb(-1, 256, 7);
        assert_eq!(c.channels(), [0, 255, 7]);
    }

    #[test]
    fn invert_and_gray() {
        assert_eq!(Color::rgb(0, 100, 255).invert(), Color::rgb(255, 155, 0));
        // 0.299·10 + 0.587·20 + 0.114·30 = 18.15
        assert_eq!(Color::rgb(10, 20, 30).grayscale(), 18);
        // 0.299·255 + 0.587·1 = 76.832 → rounds up
        assert_eq!(Color::rgb(255, 1, 0).grayscale(), 77);
        assert_eq!(Color::rgb(255, 1, 0).to_grayscale(), Color::rgb(77, 77, 77));
        assert_eq!(Color::WHITE.grayscale(), 255);
    }

    #[test]
    fn luminance_is_unrounded() {
        assert!((Color::rgb(0, 255, 0).luminance() - 182.376).abs() < 1e-9);
        assert!((Color::WHITE.luminance() - 255.0).abs() < 1e-9);
    }

    #[test]
    fn darken_lighten() {
        assert_eq!(Color::rgb(200, 100, 50).darken(0.5), Color::rgb(100, 50, 25));
        assert_eq!(Color::rgb(200, 100, 50).darken(2.0), Color::BLACK);
        assert_eq!(Color::rgb(155, 55, 255).lighten(0.5), Color::rgb(205, 155, 255));
        assert_eq!(Color::rgb(1, 2, 3).lighten(1.0), Color::WHITE);
    }

    #[test]
    fn arithmetic_clamps() {
        let a = Color::rgb(200, 10, 100);
        let b = Color::rgb(100, 20, 100);
        assert_eq!(a + b, Color::rgb(255, 30, 200));
        assert_eq!(a - b, Color::rgb(100, 0, 0));
        assert_eq!(a * 1.5, Color::rgb(255, 15, 150));
        assert_eq!(a * -1.0, Color::BLACK);
    }

    #[test]
    fn blend_endpoints() {
        let a = Color::rgb(0, 0, 0);
        let b = Color::rgb(200, 100, 50);
        assert_eq!(a.blend(b, 0.0), a);
        assert_eq!(a.blend(b, 1.0), b);
        assert_eq!(a.blend(b, 0.5), Color::rgb(100, 50, 25));
        assert_eq!(a.blend(b, 7.0), b);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsv(60.0, 1.0, 1.0), Color::rgb(255, 255, 0));
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0), Color::rgb(0, 0, 255));
        assert_eq!(Color::from_hsv(360.0, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsv(-120.0, 1.0, 1.0), Color::rgb(0, 0, 255));
        assert_eq!(Color::from_hsv(200.0, 0.0, 0.5), Color::rgb(127, 127, 127));
    }

    #[test]
    fn to_hsv_inverts_from_hsv() {
        for h in [0.0, 60.0, 120.0, 180.0, 240.0, 300.0] {
            let hsv = Color::from_hsv(h, 1.0, 1.0).to_hsv();
            assert!((hsv.h - h).abs() < 1e-9, "hue {h} came back as {}", hsv.h);
            assert_eq!(hsv.s, 1.0);
            assert_eq!(hsv.v, 1.0);
        }
    }

    #[test]
    fn to_hsv_wraps_negative_hue() {
        // Magenta-ish red: max is R and G < B, so the raw hue is negative.
        let hsv = Color::rgb(255, 0, 51).to_hsv();
        assert!((hsv.h - 348.0).abs() < 1e-9);
    }

    #[test]
    fn achromatic_hue_is_zero() {
        let hsv = Color::rgb(90, 90, 90).to_hsv();
        assert_eq!(hsv.h, 0.0);
        assert_eq!(hsv.s, 0.0);
        assert_eq!(Color::BLACK.to_hsv().s, 0.0);
    }

    #[test]
    fn hex_round_trip() {
        for c in [Color::BLACK, Color::WHITE, Color::rgb(1, 171, 254), Color::rgb(16, 0, 9)] {
            assert_eq!(Color::from_hex(&c.to_hex()).unwrap(), c);
        }
        assert_eq!(Color::rgb(171, 205, 239).to_hex(), "#ABCDEF");
        assert_eq!(Color::from_hex("#abcdef").unwrap(), Color::rgb(171, 205, 239));
    }

    #[test]
    fn hex_rejects_malformed() {
        for bad in ["", "ABCDEF", "#ABCDE", "#ABCDEF0", "#GG0000", "#+F0000", "#ééé"] {
            assert!(
                matches!(Color::from_hex(bad), Err(RenderError::InvalidFormat { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn text_round_trip() {
        let c = Color::rgb(12, 34, 56);
        assert_eq!(c.to_string(), "RGB(12, 34, 56)");
        assert_eq!(c.to_string().parse::<Color>().unwrap(), c);
        assert_eq!(" ( 1 ,2, 3 ) ".parse::<Color>().unwrap(), Color::rgb(1, 2, 3));
        assert_eq!("(300, -4, 9)".parse::<Color>().unwrap(), Color::rgb(255, 0, 9));
    }

    #[test]
    fn text_rejects_malformed() {
        for bad in ["", "1, 2, 3", "(1, 2)", "(1, 2, 3, 4)", "(a, 2, 3)", "(1, 2, 3", "RGB 1 2 3"] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should be rejected");
        }
    }
}
