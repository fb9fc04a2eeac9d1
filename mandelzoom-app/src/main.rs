mod config;

use std::process::ExitCode;

use tracing::{error, info, warn};

use mandelzoom_core::{Complex, DoubleDouble, RenderWindow, Scalar};
use mandelzoom_render::{PngSequenceSink, ZoomReport, ZoomSequence};

use config::{Backend, ZoomConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting mandelzoom");
    info!(threads = rayon::current_num_threads(), "Worker pool ready");

    let config = ZoomConfig::load();
    info!(
        backend = ?config.backend,
        width = config.width_px,
        height = config.height_px,
        frames = config.frame_count,
        output = %config.output_dir.display(),
        "Zoom configured"
    );

    match run(&config) {
        Ok(report) if report.failed.is_empty() => ExitCode::SUCCESS,
        Ok(report) => {
            warn!(failed = ?report.failed, "Some frames were not written");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Zoom failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ZoomConfig) -> mandelzoom_render::Result<ZoomReport> {
    match config.backend {
        Backend::F64 => run_with::<f64>(config),
        Backend::DoubleDouble => run_with::<DoubleDouble>(config),
        #[cfg(feature = "mpfr")]
        Backend::Mpfr => run_with::<mandelzoom_core::mpfr::Float>(config),
        #[cfg(not(feature = "mpfr"))]
        Backend::Mpfr => {
            error!("Built without the `mpfr` feature, falling back to double-double");
            run_with::<DoubleDouble>(config)
        }
    }
}

fn run_with<T: Scalar>(config: &ZoomConfig) -> mandelzoom_render::Result<ZoomReport> {
    let window = start_window::<T>(config)?;
    let palette = config.palette.build()?;
    let mut sink = PngSequenceSink::new(&config.output_dir, config.file_prefix.as_str());
    let mut sequence = ZoomSequence::new(
        window,
        config.initial_budget,
        config.hard_cap,
        palette,
        config.frame_count,
        config.scale_factor,
    )?
    .with_policy(config.policy);

    Ok(sequence.run(&mut sink))
}

/// Builds the first frame's window and reports the precision the backend actually carries.
fn start_window<T: Scalar>(config: &ZoomConfig) -> mandelzoom_render::Result<RenderWindow<T>> {
    let precision = config.precision;
    let center = Complex::new(
        T::parse(&config.center_re, &precision)?,
        T::parse(&config.center_im, &precision)?,
    );
    let span = T::from_f64(config.span_width, &precision);
    let window = RenderWindow::with_aspect_span(
        precision,
        config.width_px,
        config.height_px,
        center,
        span,
    )?;
    info!(
        bits = window.center().re.significant_bits(),
        requested = precision.bits(),
        "Numeric precision"
    );
    Ok(window)
}
