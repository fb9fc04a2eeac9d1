pub mod color;
pub mod color_grid;
pub mod colorize;
pub mod count_grid;
pub mod error;
pub mod export;
pub mod histogram;
pub mod palette;
pub mod renderer;
pub mod zoom;

pub use color::{Color, Hsv};
pub use color_grid::ColorGrid;
pub use colorize::{colorize, colorize_with_table, ColorPolicy, INTERIOR_COLOR};
pub use count_grid::CountGrid;
pub use error::RenderError;
pub use export::{export_png, PngSequenceSink};
pub use histogram::{BrightnessTable, Cdf, Histogram};
pub use palette::Palette;
pub use renderer::compute_counts;
pub use zoom::{run_zoom_sequence, FrameReport, FrameSink, ZoomReport, ZoomSequence};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
