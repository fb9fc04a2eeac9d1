use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use mandelzoom_core::{IterationBudget, RenderWindow, Scalar};

use crate::color_grid::ColorGrid;
use crate::colorize::{colorize, ColorPolicy};
use crate::error::RenderError;
use crate::palette::Palette;
use crate::renderer::compute_counts;

/// Receives each finished frame of a zoom sequence.
///
/// A failure is recorded against that frame only; the sequence carries on
/// with the next one.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &ColorGrid, index: usize) -> crate::Result<()>;
}

impl<F> FrameSink for F
where
    F: FnMut(&ColorGrid, usize) -> crate::Result<()>,
{
    fn write_frame(&mut self, frame: &ColorGrid, index: usize) -> crate::Result<()> {
        self(frame, index)
    }
}

/// What happened to one frame.
#[derive(Debug)]
pub struct FrameReport {
    pub index: usize,
    pub budget: IterationBudget,
    pub zoom_ratio: f64,
    pub elapsed: Duration,
    pub outcome: crate::Result<()>,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoomReport {
    pub frames: usize,
    pub written: usize,
    pub failed: Vec<usize>,
}

/// A fixed-center zoom, one frame per step.
///
/// Each frame gets an adaptive iteration budget from the ratio of the first
/// frame's real span to the current one, is rendered and colorized, and is
/// handed to a [`FrameSink`]. The span then shrinks by the scale factor.
/// Frames are strictly sequential; the parallelism is inside each frame.
#[derive(Debug, Clone)]
pub struct ZoomSequence<T> {
    window: Option<RenderWindow<T>>,
    initial_span: T,
    initial_budget: IterationBudget,
    hard_cap: IterationBudget,
    palette: Palette,
    policy: ColorPolicy,
    frame_count: usize,
    scale_factor: T,
    next_index: usize,
    aliasing_reported: bool,
}

impl<T: Scalar> ZoomSequence<T> {
    pub fn new(
        window: RenderWindow<T>,
        initial_budget: IterationBudget,
        hard_cap: IterationBudget,
        palette: Palette,
        frame_count: usize,
        scale_factor: f64,
    ) -> crate::Result<Self> {
        if !(scale_factor > 0.0 && scale_factor < 1.0) {
            return Err(RenderError::InvalidScaleFactor(scale_factor));
        }
        if palette.is_empty() {
            return Err(RenderError::EmptyPalette);
        }
        let scale_factor = T::from_f64(scale_factor, window.precision());
        let initial_span = window.span().0.clone();
        debug!(
            frame_count,
            initial_budget = initial_budget.get(),
            hard_cap = hard_cap.get(),
            palette_len = palette.len(),
            "Zoom sequence configured"
        );
        Ok(Self {
            window: Some(window),
            initial_span,
            initial_budget,
            hard_cap,
            palette,
            policy: ColorPolicy::default(),
            frame_count,
            scale_factor,
            next_index: 0,
            aliasing_reported: false,
        })
    }

    pub fn with_policy(mut self, policy: ColorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Window of the next frame, or `None` once the sequence has ended.
    pub fn current_window(&self) -> Option<&RenderWindow<T>> {
        self.window.as_ref().filter(|_| !self.is_finished())
    }

    pub fn frames_done(&self) -> usize {
        self.next_index
    }

    pub fn is_finished(&self) -> bool {
        self.window.is_none() || self.next_index >= self.frame_count
    }

    /// Render, colorize and emit one frame, then step the zoom.
    pub fn next_frame<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Option<FrameReport> {
        if self.is_finished() {
            return None;
        }
        let window = self.window.take()?;
        let index = self.next_index;
        let start = Instant::now();

        let zoom_ratio = (self.initial_span.clone() / window.span().0.clone()).to_f64();
        let budget = IterationBudget::adaptive(self.initial_budget, zoom_ratio, self.hard_cap);

        if !self.aliasing_reported && !window.pixel_spacing_resolvable() {
            warn!(
                frame = index,
                bits = window.precision().bits(),
                "Pixel spacing is below numeric precision; raise precision to avoid blocky output"
            );
            self.aliasing_reported = true;
        }

        let counts = compute_counts(&window, budget);
        let outcome = colorize(&counts, &self.palette, self.policy)
            .and_then(|grid| sink.write_frame(&grid, index));
        let elapsed = start.elapsed();

        match &outcome {
            Ok(()) => info!(
                frame = index,
                budget = budget.get(),
                zoom_ratio,
                elapsed_ms = elapsed.as_millis(),
                "Frame written"
            ),
            Err(e) => warn!(frame = index, error = %e, "Frame failed, continuing"),
        }

        self.next_index += 1;
        match window.zoomed(&self.scale_factor) {
            Ok(next) => self.window = Some(next),
            Err(e) => error!(frame = index, error = %e, "Cannot zoom further, ending sequence"),
        }

        Some(FrameReport {
            index,
            budget,
            zoom_ratio,
            elapsed,
            outcome,
        })
    }

    /// Drain the sequence.
    pub fn run<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> ZoomReport {
        let mut report = ZoomReport::default();
        while let Some(frame) = self.next_frame(sink) {
            report.frames += 1;
            match frame.outcome {
                Ok(()) => report.written += 1,
                Err(_) => report.failed.push(frame.index),
            }
        }
        info!(
            frames = report.frames,
            written = report.written,
            failed = report.failed.len(),
            "Zoom sequence complete"
        );
        report
    }
}

/// Build a [`ZoomSequence`] with the equalized policy and run it to the end.
pub fn run_zoom_sequence<T: Scalar, S: FrameSink + ?Sized>(
    window: RenderWindow<T>,
    initial_budget: IterationBudget,
    palette: Palette,
    frame_count: usize,
    scale_factor: f64,
    hard_cap: IterationBudget,
    sink: &mut S,
) -> crate::Result<ZoomReport> {
    let mut sequence =
        ZoomSequence::new(window, initial_budget, hard_cap, palette, frame_count, scale_factor)?;
    Ok(sequence.run(sink))
}
