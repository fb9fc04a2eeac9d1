//! PNG frame output with embedded metadata (tEXt chunks).

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::color_grid::ColorGrid;
use crate::error::RenderError;
use crate::zoom::FrameSink;

/// Write `grid` as an 8-bit RGB PNG, adding each `(keyword, text)` pair as
/// a tEXt chunk after the standard `Software` one.
pub fn export_png(grid: &ColorGrid, path: &Path, text: &[(String, String)]) -> crate::Result<()> {
    let fail = |reason: String| RenderError::Export {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::create(path).map_err(|e| fail(format!("failed to create file: {e}")))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), grid.width(), grid.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder
        .add_text_chunk("Software".to_string(), "mandelzoom".to_string())
        .map_err(|e| fail(format!("failed to add text chunk: {e}")))?;
    for (key, value) in text {
        encoder
            .add_text_chunk(key.clone(), value.clone())
            .map_err(|e| fail(format!("failed to add text chunk '{key}': {e}")))?;
    }

    let mut writer = encoder
        .write_header()
        .map_err(|e| fail(format!("failed to write PNG header: {e}")))?;
    writer
        .write_image_data(&grid.to_rgb_bytes())
        .map_err(|e| fail(format!("failed to write PNG image data: {e}")))?;
    writer
        .finish()
        .map_err(|e| fail(format!("failed to finish PNG: {e}")))?;

    debug!(
        width = grid.width(),
        height = grid.height(),
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}

/// Writes frame `i` to `<dir>/<prefix><i>.png`, creating `dir` on first use.
#[derive(Debug, Clone)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{index}.png", self.prefix))
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, frame: &ColorGrid, index: usize) -> crate::Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| RenderError::Export {
            path: self.dir.clone(),
            reason: format!("failed to create directory: {e}"),
        })?;
        let text = [
            ("Frame".to_string(), index.to_string()),
            (
                "Resolution".to_string(),
                format!("{}x{}", frame.width(), frame.height()),
            ),
        ];
        export_png(frame, &self.path_for(index), &text)
    }
}
