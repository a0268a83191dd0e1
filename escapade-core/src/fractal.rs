use crate::complex::Complex;
use crate::error::CoreError;
use crate::real::Real;

/// The classification of a single sample.
///
/// Produced once per sample and consumed immediately by the color mapper.
/// Both classifiers share this type so the palette code does not care which
/// formula ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationResult {
    /// The orbit left the escape radius at iteration `iterations`.
    Escaped { iterations: u32 },

    /// The orbit stayed bounded for the whole iteration budget.
    Bounded,

    /// Newton's method came within tolerance of `root` at iteration `iterations`.
    Converged { iterations: u32, root: usize },

    /// Newton's method exhausted its budget, or hit a near-zero derivative.
    NotConverged,
}

impl IterationResult {
    /// `true` when the sample terminated early: escaped, or converged to a root.
    #[inline]
    pub fn escaped(&self) -> bool {
        matches!(self, Self::Escaped { .. } | Self::Converged { .. })
    }

    /// The iteration count, with the budget standing in for samples that
    /// never terminated.
    #[inline]
    pub fn iterations(&self, budget: u32) -> u32 {
        match self {
            Self::Escaped { iterations } | Self::Converged { iterations, .. } => *iterations,
            Self::Bounded | Self::NotConverged => budget,
        }
    }

    /// Index into the root set, for converged Newton samples only.
    #[inline]
    pub fn root_index(&self) -> Option<usize> {
        match self {
            Self::Converged { root, .. } => Some(*root),
            _ => None,
        }
    }
}

/// Parameters controlling escape-time iteration.
///
/// The cached `escape_radius_sq` field is recomputed on deserialization so
/// settings files always stay consistent.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EscapeParams {
    /// Maximum number of iterations before declaring a point bounded.
    pub max_iterations: u32,

    /// Bailout radius: once `|z|` exceeds this, the orbit has escaped.
    /// The iteration loop compares against `escape_radius²`.
    pub escape_radius: f64,

    #[serde(skip)]
    escape_radius_sq: f64,
}

impl<'de> serde::Deserialize<'de> for EscapeParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            #[serde(default = "default_max_iterations")]
            max_iterations: u32,
            #[serde(default = "default_escape_radius")]
            escape_radius: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.max_iterations, raw.escape_radius).map_err(serde::de::Error::custom)
    }
}

fn default_max_iterations() -> u32 {
    EscapeParams::DEFAULT_MAX_ITERATIONS
}

fn default_escape_radius() -> f64 {
    EscapeParams::DEFAULT_ESCAPE_RADIUS
}

impl EscapeParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 200;
    pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

    pub fn new(max_iterations: u32, escape_radius: f64) -> crate::Result<Self> {
        let params = Self {
            max_iterations,
            escape_radius,
            escape_radius_sq: escape_radius * escape_radius,
        };
        params.validate()?;
        Ok(params)
    }

    /// Re-check the invariants; [`with_max_iterations`](Self::with_max_iterations)
    /// does not.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations));
        }
        if self.escape_radius <= 0.0 || !self.escape_radius.is_finite() {
            return Err(CoreError::InvalidEscapeRadius(self.escape_radius));
        }
        Ok(())
    }

    /// Pre-computed squared escape radius for the inner loop.
    #[inline]
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius_sq
    }

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            escape_radius: Self::DEFAULT_ESCAPE_RADIUS,
            escape_radius_sq: Self::DEFAULT_ESCAPE_RADIUS * Self::DEFAULT_ESCAPE_RADIUS,
        }
    }
}

/// A per-sample classifier over backend `T`.
///
/// Designed for **static dispatch**: the renderer is generic over
/// `C: Classifier<T>` so the compiler can inline the iteration loop for
/// each backend.
pub trait Classifier<T: Real> {
    /// Classify one plane point.
    ///
    /// Only a resource limit of the backend can fail; "never escapes" and
    /// "never converges" are ordinary results.
    fn classify(&self, point: Complex<T>) -> crate::Result<IterationResult>;

    /// The iteration budget, needed by palettes that scale by it.
    fn max_iterations(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params() {
        let p = EscapeParams::default();
        assert_eq!(p.max_iterations, 200);
        assert!((p.escape_radius - 2.0).abs() < f64::EPSILON);
        assert!((p.escape_radius_sq() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn valid_params() {
        let p = EscapeParams::new(1000, 4.0).unwrap();
        assert_eq!(p.max_iterations, 1000);
        assert!((p.escape_radius_sq() - 16.0).abs() < f64::EPSILON);
        assert_eq!(p.with_max_iterations(10).max_iterations, 10);
    }

    #[test]
    fn invalid_max_iterations() {
        assert!(EscapeParams::new(0, 2.0).is_err());
        assert!(EscapeParams::default().with_max_iterations(0).validate().is_err());
    }

    #[test]
    fn invalid_escape_radius() {
        assert!(EscapeParams::new(200, 0.0).is_err());
        assert!(EscapeParams::new(200, -1.0).is_err());
        assert!(EscapeParams::new(200, f64::NAN).is_err());
        assert!(EscapeParams::new(200, f64::INFINITY).is_err());
    }

    #[test]
    fn deserialize_recomputes_square() {
        let p: EscapeParams = serde_json::from_str(r#"{"escape_radius": 3.0}"#).unwrap();
        assert_eq!(p.max_iterations, 200);
        assert!((p.escape_radius_sq() - 9.0).abs() < f64::EPSILON);
        assert!(serde_json::from_str::<EscapeParams>(r#"{"max_iterations": 0}"#).is_err());
    }

    #[test]
    fn result_views() {
        let e = IterationResult::Escaped { iterations: 3 };
        assert!(e.escaped());
        assert_eq!(e.iterations(200), 3);
        assert_eq!(e.root_index(), None);

        assert!(!IterationResult::Bounded.escaped());
        assert_eq!(IterationResult::Bounded.iterations(200), 200);

        let c = IterationResult::Converged {
            iterations: 7,
            root: 2,
        };
        assert!(c.escaped());
        assert_eq!(c.iterations(50), 7);
        assert_eq!(c.root_index(), Some(2));

        assert_eq!(IterationResult::NotConverged.iterations(50), 50);
        assert_eq!(IterationResult::NotConverged.root_index(), None);
    }
}
