use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use escapade_core::{Backend, EscapeParams, NewtonParams, PlaneWindow, RasterSpec};
use escapade_render::{Formula, Palette, RenderRequest};

use crate::cli::{BackendArgs, FormulaKind, PaletteKind, RenderArgs};
use crate::error::AppError;

// ---------------------------------------------------------------------------
// Render settings
// ---------------------------------------------------------------------------

/// Everything `escapade render` needs, as stored in a JSON settings file.
///
/// Every field has a default, so an empty object is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub window: PlaneWindow,
    #[serde(default = "default_size")]
    pub width: u32,
    #[serde(default = "default_size")]
    pub height: u32,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub formula: Formula,
    /// When absent, the formula's natural palette is used.
    #[serde(default)]
    pub palette: Option<Palette>,
    #[serde(default)]
    pub supersample: bool,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_size() -> u32 {
    512
}

fn default_output() -> PathBuf {
    PathBuf::from("escapade.png")
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            window: PlaneWindow::default(),
            width: default_size(),
            height: default_size(),
            backend: Backend::default(),
            formula: Formula::default(),
            palette: None,
            supersample: false,
            output: default_output(),
        }
    }
}

impl RenderSettings {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = fs::read_to_string(path).map_err(|source| AppError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&json).map_err(|source| AppError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings from `--settings` (or defaults), then every flag on top.
    pub fn resolve(args: &RenderArgs) -> Result<Self, AppError> {
        let mut settings = match &args.settings {
            Some(path) => Self::load(path)?,
            None => {
                debug!("No settings file given, using defaults");
                Self::default()
            }
        };
        settings.apply(args)?;
        Ok(settings)
    }

    /// Override fields with the flags that were given.
    pub fn apply(&mut self, args: &RenderArgs) -> Result<(), AppError> {
        if let Some(output) = &args.output {
            self.output = output.clone();
        }
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if let Some(window) = args.window {
            self.window = window;
        }
        if let Some(backend) = args.backend {
            self.backend = backend;
        }
        self.backend = apply_backend_args(self.backend, &args.backend_args)?;

        self.apply_formula_args(args)?;

        if let Some(kind) = args.palette {
            self.palette = Some(palette_for(kind, &self.formula));
        }
        if let Some(contrast) = args.contrast {
            match self.palette.get_or_insert_with(|| self.formula.default_palette()) {
                Palette::Grayscale { contrast: c } => *c = contrast,
                other => {
                    return Err(AppError::FlagMismatch {
                        flag: "contrast",
                        target: format!("the {} palette", other.name()),
                    })
                }
            }
        }
        if args.supersample {
            self.supersample = true;
        }
        Ok(())
    }

    fn apply_formula_args(&mut self, args: &RenderArgs) -> Result<(), AppError> {
        let switched = match (args.formula, &self.formula) {
            (Some(FormulaKind::Mandelbrot), Formula::Newton { .. }) => Some(Formula::default()),
            (Some(FormulaKind::Newton), Formula::Mandelbrot(_)) => Some(Formula::unity_quartic()),
            _ => None,
        };
        if let Some(formula) = switched {
            self.formula = formula;
        }

        match &mut self.formula {
            Formula::Mandelbrot(params) => {
                if args.tolerance.is_some() {
                    return Err(AppError::FlagMismatch {
                        flag: "tolerance",
                        target: "mandelbrot".into(),
                    });
                }
                let max_iterations = args.max_iterations.unwrap_or(params.max_iterations);
                let escape_radius = args.escape_radius.unwrap_or(params.escape_radius);
                *params = EscapeParams::new(max_iterations, escape_radius)?;
            }
            Formula::Newton { params, .. } => {
                if args.escape_radius.is_some() {
                    return Err(AppError::FlagMismatch {
                        flag: "escape-radius",
                        target: "newton".into(),
                    });
                }
                let max_iterations = args.max_iterations.unwrap_or(params.max_iterations);
                let tolerance = args.tolerance.unwrap_or(params.tolerance);
                *params = NewtonParams::new(max_iterations, tolerance)?;
            }
        }
        Ok(())
    }

    pub fn to_request(&self) -> Result<RenderRequest, AppError> {
        let request = RenderRequest {
            window: self.window,
            raster: RasterSpec::new(self.width, self.height)?,
            backend: self.backend,
            palette: self
                .palette
                .clone()
                .unwrap_or_else(|| self.formula.default_palette()),
            formula: self.formula.clone(),
            supersample: self.supersample,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Apply the precision flags to a backend, rejecting flags that do not fit it.
pub fn apply_backend_args(backend: Backend, args: &BackendArgs) -> Result<Backend, AppError> {
    let mismatch = |flag| AppError::FlagMismatch {
        flag,
        target: format!("the {} backend", backend.name()),
    };
    match backend {
        Backend::BigFloat { precision_bits } => {
            if args.rational_scale.is_some() {
                return Err(mismatch("rational-scale"));
            }
            if args.rational_max_bits.is_some() {
                return Err(mismatch("rational-max-bits"));
            }
            Ok(Backend::BigFloat {
                precision_bits: args.precision_bits.unwrap_or(precision_bits),
            })
        }
        Backend::Rational { scale, max_bits } => {
            if args.precision_bits.is_some() {
                return Err(mismatch("precision-bits"));
            }
            Ok(Backend::Rational {
                scale: args.rational_scale.unwrap_or(scale),
                max_bits: args.rational_max_bits.unwrap_or(max_bits),
            })
        }
        Backend::Fixed32 | Backend::Fixed64 => {
            if args.precision_bits.is_some() {
                return Err(mismatch("precision-bits"));
            }
            if args.rational_scale.is_some() {
                return Err(mismatch("rational-scale"));
            }
            if args.rational_max_bits.is_some() {
                return Err(mismatch("rational-max-bits"));
            }
            Ok(backend)
        }
    }
}

/// The palette of the given kind, configured for `formula`.
pub fn palette_for(kind: PaletteKind, formula: &Formula) -> Palette {
    match kind {
        PaletteKind::Grayscale => Palette::grayscale(),
        PaletteKind::Rgb => Palette::Rgb,
        PaletteKind::Ycbcr => Palette::YCbCr,
        PaletteKind::RootShaded => match formula {
            Formula::Newton { roots, .. } => Palette::root_shaded(roots),
            // Left for request validation to reject with a proper mismatch.
            Formula::Mandelbrot(_) => Palette::root_shaded(&escapade_core::RootSet::default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_is_all_defaults() {
        let s: RenderSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, RenderSettings::default());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "width": 64,
                "backend": {{"kind": "bigfloat", "precision_bits": 128}},
                "formula": {{"kind": "newton"}},
                "supersample": true
            }}"#
        )
        .unwrap();

        let s = RenderSettings::load(file.path()).unwrap();
        assert_eq!(s.width, 64);
        assert_eq!(s.height, 512);
        assert_eq!(s.backend, Backend::BigFloat { precision_bits: 128 });
        assert_eq!(s.formula, Formula::unity_quartic());
        assert!(s.supersample);

        let req = s.to_request().unwrap();
        assert!(req.palette.is_root_palette());
    }

    #[test]
    fn unreadable_and_malformed_files() {
        let missing = RenderSettings::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(AppError::SettingsRead { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            RenderSettings::load(file.path()),
            Err(AppError::SettingsParse { .. })
        ));
    }

    #[test]
    fn flags_override_settings() {
        let mut s = RenderSettings::default();
        let args = RenderArgs {
            width: Some(32),
            max_iterations: Some(80),
            palette: Some(PaletteKind::Rgb),
            supersample: true,
            ..RenderArgs::default()
        };
        s.apply(&args).unwrap();
        assert_eq!(s.width, 32);
        assert_eq!(s.formula.max_iterations(), 80);
        assert_eq!(s.palette, Some(Palette::Rgb));
        assert!(s.supersample);
    }

    #[test]
    fn switching_to_newton_keeps_one_budget() {
        let mut s = RenderSettings::default();
        let args = RenderArgs {
            formula: Some(FormulaKind::Newton),
            max_iterations: Some(30),
            palette: Some(PaletteKind::RootShaded),
            ..RenderArgs::default()
        };
        s.apply(&args).unwrap();
        let req = s.to_request().unwrap();
        assert_eq!(req.formula.max_iterations(), 30);
        assert_eq!(req.palette, Palette::root_shaded(&escapade_core::RootSet::unity_quartic()));
    }

    #[test]
    fn root_palette_with_mandelbrot_is_rejected() {
        let mut s = RenderSettings::default();
        let args = RenderArgs {
            palette: Some(PaletteKind::RootShaded),
            ..RenderArgs::default()
        };
        s.apply(&args).unwrap();
        assert!(matches!(
            s.to_request(),
            Err(AppError::Render(escapade_render::RenderError::PaletteMismatch { .. }))
        ));
    }

    #[test]
    fn mismatched_flags_are_errors() {
        let mut s = RenderSettings::default();
        let args = RenderArgs {
            tolerance: Some(1e-3),
            ..RenderArgs::default()
        };
        assert!(matches!(s.apply(&args), Err(AppError::FlagMismatch { .. })));

        let precision = BackendArgs {
            precision_bits: Some(64),
            ..BackendArgs::default()
        };
        assert!(apply_backend_args(Backend::Fixed64, &precision).is_err());
        assert_eq!(
            apply_backend_args(Backend::BigFloat { precision_bits: 256 }, &precision).unwrap(),
            Backend::BigFloat { precision_bits: 64 }
        );
    }

    #[test]
    fn contrast_targets_grayscale() {
        let mut s = RenderSettings::default();
        let args = RenderArgs {
            contrast: Some(3),
            ..RenderArgs::default()
        };
        s.apply(&args).unwrap();
        assert_eq!(s.palette, Some(Palette::Grayscale { contrast: 3 }));
    }
}
