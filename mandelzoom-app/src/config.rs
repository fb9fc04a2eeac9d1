use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use mandelzoom_core::{IterationBudget, Precision};
use mandelzoom_render::{ColorPolicy, Palette, RenderError};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "MANDELZOOM_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "zoom.json";

/// Scalar type used for every coordinate of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    F64,
    #[default]
    DoubleDouble,
    /// Only available when built with the `mpfr` feature.
    Mpfr,
}

/// How to build the frame palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PaletteConfig {
    Hue {
        n: usize,
        h_min: f64,
        h_max: f64,
        s: f64,
        v: f64,
        #[serde(default)]
        reverse: bool,
    },
    Saturation {
        n: usize,
        h: f64,
        s_min: f64,
        s_max: f64,
        v: f64,
        #[serde(default)]
        reverse: bool,
    },
    Brightness {
        n: usize,
        h: f64,
        s: f64,
        v_min: f64,
        v_max: f64,
        #[serde(default)]
        reverse: bool,
    },
    Grayscale {
        n: usize,
        #[serde(default)]
        reverse: bool,
    },
    Hex {
        colors: Vec<String>,
        #[serde(default)]
        reverse: bool,
    },
    Builtin {
        name: String,
        #[serde(default)]
        reverse: bool,
    },
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self::Hue {
            n: 256,
            h_min: 0.0,
            h_max: 360.0,
            s: 1.0,
            v: 0.9,
            reverse: true,
        }
    }
}

impl PaletteConfig {
    pub fn build(&self) -> Result<Palette, RenderError> {
        let (palette, reverse) = match self {
            Self::Hue { n, h_min, h_max, s, v, reverse } => {
                (Palette::gradation_hue(*n, *h_min, *h_max, *s, *v), *reverse)
            }
            Self::Saturation { n, h, s_min, s_max, v, reverse } => {
                (Palette::gradation_saturation(*n, *h, *s_min, *s_max, *v), *reverse)
            }
            Self::Brightness { n, h, s, v_min, v_max, reverse } => {
                (Palette::gradation_brightness(*n, *h, *s, *v_min, *v_max), *reverse)
            }
            Self::Grayscale { n, reverse } => (Palette::grayscale(*n), *reverse),
            Self::Hex { colors, reverse } => (Palette::from_hex_list(colors.as_slice())?, *reverse),
            Self::Builtin { name, reverse } => {
                let palette = Palette::builtin(name).ok_or_else(|| RenderError::InvalidFormat {
                    input: name.clone(),
                    reason: format!(
                        "unknown palette, expected one of {:?}",
                        Palette::builtin_names()
                    ),
                })?;
                (palette, *reverse)
            }
        };
        Ok(if reverse { palette.reversed() } else { palette })
    }
}

/// Everything needed for one zoom run. Missing fields take the defaults of
/// the reference run: a 200-frame, 64×64 dive into the seahorse valley.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default = "default_side_px")]
    pub width_px: u32,
    #[serde(default = "default_side_px")]
    pub height_px: u32,
    /// Decimal strings so the center can carry more digits than `f64`.
    #[serde(default = "default_center_re")]
    pub center_re: String,
    #[serde(default = "default_center_im")]
    pub center_im: String,
    /// Real span of the first frame; the imaginary span follows the aspect ratio.
    #[serde(default = "default_span_width")]
    pub span_width: f64,
    #[serde(default)]
    pub initial_budget: IterationBudget,
    #[serde(default = "default_hard_cap")]
    pub hard_cap: IterationBudget,
    #[serde(default = "default_frame_count")]
    pub frame_count: usize,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub policy: ColorPolicy,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_side_px() -> u32 {
    64
}
fn default_center_re() -> String {
    "-1.26222162762384535370226702572022420406".to_string()
}
fn default_center_im() -> String {
    "0.04591700163513884695098681782544085357512".to_string()
}
fn default_span_width() -> f64 {
    2.0
}
fn default_hard_cap() -> IterationBudget {
    IterationBudget::new(IterationBudget::DEFAULT_HARD_CAP).unwrap_or_default()
}
fn default_frame_count() -> usize {
    200
}
fn default_scale_factor() -> f64 {
    0.87
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("frames")
}
fn default_file_prefix() -> String {
    "output".to_string()
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            precision: Precision::default(),
            width_px: default_side_px(),
            height_px: default_side_px(),
            center_re: default_center_re(),
            center_im: default_center_im(),
            span_width: default_span_width(),
            initial_budget: IterationBudget::default(),
            hard_cap: default_hard_cap(),
            frame_count: default_frame_count(),
            scale_factor: default_scale_factor(),
            palette: PaletteConfig::default(),
            policy: ColorPolicy::default(),
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl ZoomConfig {
    /// Load from `$MANDELZOOM_CONFIG`, else `zoom.json`, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<ZoomConfig>(&json) {
                    Ok(config) => {
                        info!("Loaded zoom config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        error!("Failed to parse zoom config: {e}");
                    }
                },
                Err(e) => {
                    error!("Failed to read zoom config file: {e}");
                }
            }
        } else {
            debug!("No zoom config at {}, using defaults", path.display());
        }
        Self::default()
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandelzoom_render::Color;

    #[test]
    fn defaults_match_reference_run() {
        let c = ZoomConfig::default();
        assert_eq!(c.precision.bits(), 64);
        assert_eq!((c.width_px, c.height_px), (64, 64));
        assert_eq!(c.initial_budget.get(), 300);
        assert_eq!(c.hard_cap.get(), 30_000);
        assert_eq!(c.frame_count, 200);
        assert_eq!(c.scale_factor, 0.87);
        assert_eq!(c.policy, ColorPolicy::Equalized);
        assert_eq!(c.output_dir, PathBuf::from("frames"));
    }

    #[test]
    fn empty_json_is_default() {
        let c: ZoomConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, ZoomConfig::default());
    }

    #[test]
    fn partial_json_overrides() {
        let json = r#"{
            "backend": "f64",
            "precision": 128,
            "frame_count": 5,
            "policy": "linear-bucket",
            "palette": { "kind": "grayscale", "n": 4 }
        }"#;
        let c: ZoomConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.backend, Backend::F64);
        assert_eq!(c.precision.bits(), 128);
        assert_eq!(c.frame_count, 5);
        assert_eq!(c.policy, ColorPolicy::LinearBucket);
        assert_eq!(c.palette, PaletteConfig::Grayscale { n: 4, reverse: false });
        assert_eq!(c.width_px, 64);
    }

    #[test]
    fn invalid_budget_rejected() {
        assert!(serde_json::from_str::<ZoomConfig>(r#"{ "initial_budget": 0 }"#).is_err());
    }

    #[test]
    fn default_palette_is_reversed_hue() {
        let p = PaletteConfig::default().build().unwrap();
        assert_eq!(p.len(), 256);
        let forward = Palette::gradation_hue(256, 0.0, 360.0, 1.0, 0.9);
        assert_eq!(p.first(), forward.last());
        assert_eq!(p.last(), forward.first());
    }

    #[test]
    fn palette_variants_build() {
        let json = r##"{ "kind": "hex", "colors": ["#000000", "#FFFFFF"], "reverse": true }"##;
        let hex: PaletteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(hex.build().unwrap().colors(), &[Color::WHITE, Color::BLACK]);

        let sat = PaletteConfig::Saturation {
            n: 3,
            h: 0.0,
            s_min: 0.0,
            s_max: 1.0,
            v: 1.0,
            reverse: false,
        };
        assert_eq!(sat.build().unwrap().len(), 3);
        let bri = PaletteConfig::Brightness {
            n: 5,
            h: 0.0,
            s: 1.0,
            v_min: 0.0,
            v_max: 1.0,
            reverse: false,
        };
        assert_eq!(bri.build().unwrap().first(), Some(Color::BLACK));
        let builtin = PaletteConfig::Builtin { name: "fire".into(), reverse: false };
        assert_eq!(builtin.build().unwrap().len(), 256);
    }

    #[test]
    fn bad_palettes_fail() {
        let unknown = PaletteConfig::Builtin { name: "plaid".into(), reverse: false };
        assert!(matches!(unknown.build(), Err(RenderError::InvalidFormat { .. })));
        let hex = PaletteConfig::Hex { colors: vec!["red".into()], reverse: false };
        assert!(hex.build().is_err());
    }

    #[test]
    fn missing_or_broken_file_falls_back() {
        let dir = std::env::temp_dir().join("mandelzoom_test_config");
        let _ = fs::create_dir_all(&dir);
        assert_eq!(ZoomConfig::load_from(&dir.join("absent.json")), ZoomConfig::default());

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(ZoomConfig::load_from(&broken), ZoomConfig::default());

        let good = dir.join("good.json");
        fs::write(&good, r#"{ "frame_count": 3, "scale_factor": 0.5 }"#).unwrap();
        let loaded = ZoomConfig::load_from(&good);
        assert_eq!(loaded.frame_count, 3);
        assert_eq!(loaded.scale_factor, 0.5);

        let _ = fs::remove_dir_all(&dir);
    }
}
