use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::color::Color;
use crate::error::RenderError;

/// An ordered list of colors used as a lookup table for iteration counts.
///
/// Insertion order is rendering order. Duplicates are allowed; call
/// [`dedup`](Self::dedup) to drop them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Parse a list of `#RRGGBB` strings, failing on the first malformed one.
    pub fn from_hex_list<S: AsRef<str>>(hexes: &[S]) -> crate::Result<Self> {
        hexes
            .iter()
            .map(|h| Color::from_hex(h.as_ref()))
            .collect::<crate::Result<Vec<_>>>()
            .map(Self::new)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.colors.iter()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    pub fn at(&self, index: usize) -> crate::Result<Color> {
        self.get(index).ok_or(RenderError::IndexOutOfRange {
            index,
            len: self.colors.len(),
        })
    }

    pub fn first(&self) -> Option<Color> {
        self.colors.first().copied()
    }

    pub fn last(&self) -> Option<Color> {
        self.colors.last().copied()
    }

    pub fn add(&mut self, color: Color) {
        self.colors.push(color);
    }

    /// Remove every entry equal to `color`. Returns how many were removed.
    pub fn remove(&mut self, color: Color) -> usize {
        let before = self.colors.len();
        self.colors.retain(|&c| c != color);
        self.colors.shrink_to_fit();
        before - self.colors.len()
    }

    pub fn remove_at(&mut self, index: usize) -> crate::Result<Color> {
        if index >= self.colors.len() {
            return Err(RenderError::IndexOutOfRange {
                index,
                len: self.colors.len(),
            });
        }
        let removed = self.colors.remove(index);
        self.colors.shrink_to_fit();
        Ok(removed)
    }

    pub fn reverse(&mut self) {
        self.colors.reverse();
    }

    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.colors.shrink_to_fit();
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Drop repeated colors, keeping each one's first occurrence in place.
    pub fn dedup(&mut self) {
        let mut seen = HashSet::with_capacity(self.colors.len());
        self.colors.retain(|&c| seen.insert(c));
    }

    /// Lexicographic by `(r, g, b)`, ascending.
    pub fn sort_by_rgb(&mut self) {
        self.colors.sort();
    }

    /// Ascending relative luminance.
    pub fn sort_by_luminance(&mut self) {
        self.colors
            .sort_by(|a, b| a.luminance().total_cmp(&b.luminance()));
    }

    /// Circular hue order: `a` goes before `b` when `b`'s hue lies strictly
    /// between 0° and 180° ahead of `a`'s.
    ///
    /// That relation is not transitive around the full circle, so the result
    /// depends on input order whenever the hues span more than a half turn.
    /// A stable insertion sort is used because it only ever asks "does this
    /// element go before its left neighbour?", which stays well defined for
    /// any relation.
    pub fn sort_by_hue(&mut self) {
        let hues: Vec<f64> = self.colors.iter().map(|c| c.to_hsv().h).collect();
        let mut keyed: Vec<(f64, Color)> = hues.into_iter().zip(self.colors.drain(..)).collect();
        for i in 1..keyed.len() {
            let mut j = i;
            while j > 0 && hue_precedes(keyed[j].0, keyed[j - 1].0) {
                keyed.swap(j, j - 1);
                j -= 1;
            }
        }
        self.colors = keyed.into_iter().map(|(_, c)| c).collect();
    }

    // -- Generators --

    /// `n` colors with hue stepped evenly from `h_min` to `h_max` (inclusive).
    pub fn gradation_hue(n: usize, h_min: f64, h_max: f64, s: f64, v: f64) -> Self {
        gradation(n, h_min, h_max, |h| Color::from_hsv(h, s, v))
    }

    /// `n` colors with saturation stepped evenly from `s_min` to `s_max`.
    pub fn gradation_saturation(n: usize, h: f64, s_min: f64, s_max: f64, v: f64) -> Self {
        gradation(n, s_min, s_max, |s| Color::from_hsv(h, s, v))
    }

    /// `n` colors with brightness (HSV value) stepped evenly from `v_min` to `v_max`.
    pub fn gradation_brightness(n: usize, h: f64, s: f64, v_min: f64, v_max: f64) -> Self {
        gradation(n, v_min, v_max, |v| Color::from_hsv(h, s, v))
    }

    /// `n` grays with integer step `256 / n`, brightest first.
    ///
    /// The darkest entry is always black; the brightest is `step · (n − 1)`,
    /// e.g. `[192, 128, 64, 0]` for `n = 4`.
    pub fn grayscale(n: usize) -> Self {
        if n == 0 {
            return Self::default();
        }
        let step = 256 / n;
        let mut palette: Self = (0..n)
            .map(|i| {
                let v = (step * i) as i32;
                Color::clamped(v, v, v)
            })
            .collect();
        palette.reverse();
        palette.fit_len(n);
        palette
    }

    /// `n` colors interpolated through positioned stops (`0.0..=1.0`).
    ///
    /// Stops must be sorted by position. Before the first stop the first
    /// color is used, after the last stop the last color.
    pub fn gradient(n: usize, stops: &[(f64, Color)]) -> crate::Result<Self> {
        if stops.is_empty() {
            return Err(RenderError::EmptyPalette);
        }
        let colors = (0..n)
            .map(|i| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                let lo = stops.iter().rposition(|&(pos, _)| pos <= t).unwrap_or(0);
                let hi = (lo + 1).min(stops.len() - 1);
                let (lo_t, lo_c) = stops[lo];
                let (hi_t, hi_c) = stops[hi];
                let frac = if (hi_t - lo_t).abs() < 1e-10 {
                    0.0
                } else {
                    (t - lo_t) / (hi_t - lo_t)
                };
                lo_c.blend(hi_c, frac)
            })
            .collect();
        Ok(Self::new(colors))
    }

    /// A named 256-entry stop palette: `classic`, `fire`, `ocean`, `neon`,
    /// or `grayscale`.
    pub fn builtin(name: &str) -> Option<Self> {
        let stops: &[(f64, Color)] = match name {
            "classic" => &[
                (0.0, Color::rgb(0, 7, 100)),
                (0.16, Color::rgb(32, 107, 203)),
                (0.42, Color::rgb(237, 255, 255)),
                (0.6425, Color::rgb(255, 170, 0)),
                (0.8575, Color::rgb(0, 2, 0)),
                (1.0, Color::rgb(0, 7, 100)),
            ],
            "fire" => &[
                (0.0, Color::rgb(0, 0, 0)),
                (0.25, Color::rgb(128, 0, 0)),
                (0.5, Color::rgb(255, 128, 0)),
                (0.75, Color::rgb(255, 255, 0)),
                (1.0, Color::rgb(255, 255, 255)),
            ],
            "ocean" => &[
                (0.0, Color::rgb(0, 0, 30)),
                (0.3, Color::rgb(0, 50, 120)),
                (0.6, Color::rgb(0, 150, 200)),
                (0.8, Color::rgb(100, 220, 255)),
                (1.0, Color::rgb(240, 255, 255)),
            ],
            "neon" => &[
                (0.0, Color::rgb(10, 0, 20)),
                (0.2, Color::rgb(80, 0, 150)),
                (0.4, Color::rgb(200, 0, 200)),
                (0.6, Color::rgb(0, 200, 255)),
                (0.8, Color::rgb(0, 255, 100)),
                (1.0, Color::rgb(10, 0, 20)),
            ],
            "grayscale" => &[(0.0, Color::BLACK), (1.0, Color::WHITE)],
            _ => return None,
        };
        Self::gradient(BUILTIN_SIZE, stops).ok()
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["classic", "fire", "ocean", "neon", "grayscale"]
    }

    /// Force the length to exactly `n`: truncate from the end, or pad by
    /// repeating the last color. An empty palette cannot be padded.
    fn fit_len(&mut self, n: usize) {
        if self.colors.len() > n {
            self.colors.truncate(n);
        } else if let Some(&last) = self.colors.last() {
            self.colors.resize(n, last);
        }
    }
}

const BUILTIN_SIZE: usize = 256;

/// Shared body of the HSV gradations: `n` samples from `from` to `to`
/// inclusive, length-corrected to exactly `n`.
fn gradation(n: usize, from: f64, to: f64, make: impl Fn(f64) -> Color) -> Palette {
    let step = if n > 1 { (to - from) / (n - 1) as f64 } else { 0.0 };
    let mut palette: Palette = (0..n).map(|i| make(from + i as f64 * step)).collect();
    palette.fit_len(n);
    palette
}

/// `b`'s hue is less than a half turn ahead of `a`'s.
fn hue_precedes(a: f64, b: f64) -> bool {
    let ahead = (b - a).rem_euclid(360.0);
    ahead > 0.0 && ahead < 180.0
}

impl FromIterator<Color> for Palette {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<Color>> for Palette {
    fn from(colors: Vec<Color>) -> Self {
        Self::new(colors)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.colors.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Parses whitespace-separated colors in the [`Color`] text form. Stops at
/// the first malformed color.
impl FromStr for Palette {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut colors = Vec::new();
        let mut rest = s.trim_start();
        while !rest.is_empty() {
            let end = rest
                .find(')')
                .ok_or_else(|| RenderError::format(rest, "unterminated color"))?;
            colors.push(rest[..=end].parse::<Color>()?);
            rest = rest[end + 1..].trim_start();
        }
        Ok(Self::new(colors))
    }
}
