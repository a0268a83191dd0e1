use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;
use crate::fractal::{Classifier, IterationResult};
use crate::real::Real;

/// `|f'(z)|` below this is treated as a zero derivative.
///
/// The Newton step would divide by it; the sample is reported as
/// [`IterationResult::NotConverged`] instead of producing inf/NaN.
pub const DEGENERATE_DERIVATIVE: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Polynomial
// ---------------------------------------------------------------------------

/// A polynomial with real coefficients, in ascending powers of `z`.
///
/// Newton's method needs `f` and `f'`; both are evaluated from this data,
/// so swapping the formula never touches the iteration loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Trailing zero coefficients are dropped. The result must have degree
    /// at least one, otherwise there is nothing to solve.
    pub fn new(mut coefficients: Vec<f64>) -> crate::Result<Self> {
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(CoreError::InvalidPolynomial {
                reason: format!("coefficients must be finite, got {coefficients:?}"),
            });
        }
        while coefficients.last() == Some(&0.0) {
            coefficients.pop();
        }
        if coefficients.len() < 2 {
            return Err(CoreError::InvalidPolynomial {
                reason: "degree must be at least 1".into(),
            });
        }
        Ok(Self { coefficients })
    }

    /// `z⁴ − 1`, whose roots are the fourth roots of unity.
    pub fn unity_quartic() -> Self {
        Self {
            coefficients: vec![-1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients of `f'`. A linear polynomial yields a constant.
    pub fn derivative_coefficients(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, c)| c * power as f64)
            .collect()
    }
}

impl Default for Polynomial {
    fn default() -> Self {
        Self::unity_quartic()
    }
}

impl TryFrom<Vec<f64>> for Polynomial {
    type Error = CoreError;

    fn try_from(coefficients: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(coefficients)
    }
}

impl From<Polynomial> for Vec<f64> {
    fn from(p: Polynomial) -> Self {
        p.coefficients
    }
}

/// Horner evaluation of real `coefficients` (ascending) at complex `z`.
fn horner<T: Real>(coefficients: &[T], z: &Complex<T>, zero: &T) -> Complex<T> {
    let mut iter = coefficients.iter().rev();
    let lead = iter.next().cloned().unwrap_or_else(|| zero.clone());
    let mut acc = Complex::new(lead, zero.clone());
    for c in iter {
        acc = acc * z.clone();
        acc.re = acc.re + c.clone();
    }
    acc
}

// ---------------------------------------------------------------------------
// Roots
// ---------------------------------------------------------------------------

/// A known root of the Newton polynomial and the color of its basin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub re: f64,
    pub im: f64,
    pub color: [u8; 3],
}

impl Root {
    pub const fn new(re: f64, im: f64, color: [u8; 3]) -> Self {
        Self { re, im, color }
    }

    pub fn point(&self) -> Complex<f64> {
        Complex::new(self.re, self.im)
    }
}

/// Ordered roots, tested in declaration order.
///
/// The first root within tolerance wins. When tolerance bands overlap near
/// a basin boundary this biases classification toward earlier roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootSet {
    roots: Vec<Root>,
}

impl RootSet {
    pub fn new(roots: Vec<Root>) -> Self {
        Self { roots }
    }

    /// The roots of `z⁴ − 1`: `1, −1, i, −i` in red, green, blue, yellow.
    pub fn unity_quartic() -> Self {
        Self::new(vec![
            Root::new(1.0, 0.0, [255, 0, 0]),
            Root::new(-1.0, 0.0, [0, 255, 0]),
            Root::new(0.0, 1.0, [0, 0, 255]),
            Root::new(0.0, -1.0, [255, 255, 0]),
        ])
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Root> {
        self.roots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Root> {
        self.roots.iter()
    }

    /// Base colors in root order, for the root-shaded palette.
    pub fn colors(&self) -> Vec<[u8; 3]> {
        self.roots.iter().map(|r| r.color).collect()
    }
}

impl Default for RootSet {
    fn default() -> Self {
        Self::unity_quartic()
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameters controlling Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonParams {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// A sample has converged once `|z − root|` drops below this.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_max_iterations() -> u32 {
    NewtonParams::DEFAULT_MAX_ITERATIONS
}

fn default_tolerance() -> f64 {
    NewtonParams::DEFAULT_TOLERANCE
}

impl NewtonParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 50;
    pub const DEFAULT_TOLERANCE: f64 = 1e-6;

    pub fn new(max_iterations: u32, tolerance: f64) -> crate::Result<Self> {
        let params = Self {
            max_iterations,
            tolerance,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(self.max_iterations));
        }
        if self.tolerance <= 0.0 || !self.tolerance.is_finite() {
            return Err(CoreError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

impl Default for NewtonParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Newton's method over a [`Polynomial`], classifying each start point by
/// the root it converges to.
///
/// Polynomial coefficients, roots and thresholds are converted to `T` once
/// at construction; a classification call only allocates its own orbit.
#[derive(Debug, Clone)]
pub struct Newton<T: Real> {
    params: NewtonParams,
    ctx: T::Context,
    f: Vec<T>,
    df: Vec<T>,
    roots: Vec<Complex<T>>,
    zero: T,
    tolerance_sq: T,
    degenerate_sq: T,
}

impl<T: Real> Newton<T> {
    pub fn new(polynomial: &Polynomial, roots: &RootSet, params: NewtonParams, ctx: T::Context) -> Self {
        debug!(
            backend = T::NAME,
            degree = polynomial.degree(),
            roots = roots.len(),
            "Building Newton classifier"
        );
        let convert = |cs: &[f64]| cs.iter().map(|&c| T::from_f64_exact(c, &ctx)).collect::<Vec<T>>();
        Self {
            f: convert(polynomial.coefficients()),
            df: convert(&polynomial.derivative_coefficients()),
            roots: roots.iter().map(|r| r.point().convert(&ctx)).collect(),
            zero: T::from_f64(0.0, &ctx),
            tolerance_sq: T::from_f64_exact(params.tolerance * params.tolerance, &ctx),
            degenerate_sq: T::from_f64_exact(DEGENERATE_DERIVATIVE * DEGENERATE_DERIVATIVE, &ctx),
            params,
            ctx,
        }
    }

    /// The reference scenario: `z⁴ − 1` with its four roots.
    pub fn unity_quartic(params: NewtonParams, ctx: T::Context) -> Self {
        Self::new(&Polynomial::unity_quartic(), &RootSet::unity_quartic(), params, ctx)
    }

    pub fn params(&self) -> &NewtonParams {
        &self.params
    }
}

impl<T: Real> Default for Newton<T>
where
    T::Context: Default,
{
    fn default() -> Self {
        Self::unity_quartic(NewtonParams::default(), T::Context::default())
    }
}

impl<T: Real> Classifier<T> for Newton<T> {
    fn classify(&self, mut z: Complex<T>) -> crate::Result<IterationResult> {
        for n in 0..self.params.max_iterations {
            let fz = horner(&self.f, &z, &self.zero);
            let dfz = horner(&self.df, &z, &self.zero);
            if dfz.is_zero() || dfz.norm_sq() < self.degenerate_sq {
                return Ok(IterationResult::NotConverged);
            }

            z = z - fz / dfz;
            z.check_footprint(&self.ctx)?;

            for (i, root) in self.roots.iter().enumerate() {
                if (z.clone() - root.clone()).norm_sq() < self.tolerance_sq {
                    return Ok(IterationResult::Converged {
                        iterations: n,
                        root: i,
                    });
                }
            }
        }

        Ok(IterationResult::NotConverged)
    }

    fn max_iterations(&self) -> u32 {
        self.params.max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::big_float::BigFloatContext;
    use crate::rational::RationalContext;
    use dashu_float::FBig;
    use num::BigRational;

    fn newton() -> Newton<f64> {
        Newton::default()
    }

    fn classify<T: Real>(n: &Newton<T>, re: f64, im: f64, ctx: &T::Context) -> IterationResult {
        n.classify(Complex::from_f64(re, im, ctx)).unwrap()
    }

    #[test]
    fn polynomial_trims_and_validates() {
        let p = Polynomial::new(vec![-1.0, 0.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(p.degree(), 2);
        assert!(Polynomial::new(vec![3.0]).is_err());
        assert!(Polynomial::new(vec![1.0, 0.0]).is_err());
        assert!(Polynomial::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn polynomial_deserializes_through_validation() {
        let p: Polynomial = serde_json::from_str("[1.0, 0.0, 1.0]").unwrap();
        assert_eq!(p.degree(), 2);
        assert!(serde_json::from_str::<Polynomial>("[2.0]").is_err());
    }

    #[test]
    fn derivative_of_unity_quartic() {
        let p = Polynomial::unity_quartic();
        assert_eq!(p.derivative_coefficients(), vec![0.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn horner_matches_direct_evaluation() {
        let z = Complex::new(0.5, -1.25);
        let f = Polynomial::unity_quartic();
        let direct = z * z * z * z - Complex::new(1.0, 0.0);
        let via = horner(f.coefficients(), &z, &0.0);
        assert!((direct.re - via.re).abs() < 1e-12);
        assert!((direct.im - via.im).abs() < 1e-12);
    }

    #[test]
    fn params_validation() {
        assert!(NewtonParams::new(0, 1e-6).is_err());
        assert!(NewtonParams::new(50, 0.0).is_err());
        assert!(NewtonParams::new(50, f64::NAN).is_err());
        let p = NewtonParams::default();
        assert_eq!(p.max_iterations, 50);
        assert!((p.tolerance - 1e-6).abs() < f64::EPSILON);
    }

    #[test]
    fn starting_on_a_root_converges_immediately() {
        let n = newton();
        for (i, root) in RootSet::unity_quartic().iter().enumerate() {
            assert_eq!(
                classify(&n, root.re, root.im, &()),
                IterationResult::Converged {
                    iterations: 0,
                    root: i
                }
            );
        }
    }

    #[test]
    fn converges_from_a_nearby_start() {
        match classify(&newton(), 2.0, 0.0, &()) {
            IterationResult::Converged { root, iterations } => {
                assert_eq!(root, 0);
                assert!(iterations > 0 && iterations < 50);
            }
            other => panic!("2 + 0i should converge to 1, got {other:?}"),
        }
        assert_eq!(classify(&newton(), 0.0, -3.0, &()).root_index(), Some(3));
    }

    #[test]
    fn zero_derivative_reports_not_converged() {
        // f'(0) = 0: the step is undefined.
        assert_eq!(classify(&newton(), 0.0, 0.0, &()), IterationResult::NotConverged);
        let rc = RationalContext::default();
        assert_eq!(
            classify(&Newton::<BigRational>::default(), 0.0, 0.0, &rc),
            IterationResult::NotConverged
        );
        let fc = BigFloatContext::default();
        assert_eq!(
            classify(&Newton::<FBig>::default(), 0.0, 0.0, &fc),
            IterationResult::NotConverged
        );
    }

    #[test]
    fn rational_start_on_a_root_converges_immediately() {
        let rc = RationalContext::default();
        let n = Newton::<BigRational>::default();
        for (i, root) in RootSet::unity_quartic().iter().enumerate() {
            assert_eq!(
                classify(&n, root.re, root.im, &rc),
                IterationResult::Converged {
                    iterations: 0,
                    root: i
                }
            );
        }
    }

    #[test]
    fn rational_thresholds_survive_a_coarse_scale() {
        // At scale 1000 a truncated 1e-12 would be 0 and nothing could converge.
        let rc = RationalContext::new(1000, 1 << 16).unwrap();
        let n = Newton::<BigRational>::unity_quartic(NewtonParams::default(), rc);
        assert_eq!(classify(&n, 0.0, 1.0, &rc).root_index(), Some(2));
        assert_eq!(classify(&n, 0.0, 0.0, &rc), IterationResult::NotConverged);
    }

    #[test]
    fn exhausted_budget_reports_not_converged() {
        let n = Newton::<f64>::unity_quartic(NewtonParams::new(1, 1e-6).unwrap(), ());
        assert_eq!(classify(&n, 2.0, 0.0, &()), IterationResult::NotConverged);
    }

    #[test]
    fn overlapping_bands_prefer_earlier_root() {
        // From 0.5 + 0.5i one step lands on -0.125 - 0.125i, exactly
        // equidistant from -1 (index 1) and -i (index 3).
        let n = Newton::<f64>::unity_quartic(NewtonParams::new(50, 1.0).unwrap(), ());
        assert_eq!(
            classify(&n, 0.5, 0.5, &()),
            IterationResult::Converged {
                iterations: 0,
                root: 1
            }
        );
    }

    #[test]
    fn declaration_order_beats_distance() {
        // With a wide tolerance, a start on 1 also lies within the band of i.
        // Declaring i first makes it win.
        let roots = RootSet::new(vec![
            Root::new(0.0, 1.0, [0, 0, 255]),
            Root::new(1.0, 0.0, [255, 0, 0]),
        ]);
        let n = Newton::<f64>::new(
            &Polynomial::unity_quartic(),
            &roots,
            NewtonParams::new(50, 1.5).unwrap(),
            (),
        );
        assert_eq!(classify(&n, 1.0, 0.0, &()).root_index(), Some(0));
    }

    #[test]
    fn custom_polynomial() {
        // z² + 1 has roots ±i.
        let p = Polynomial::new(vec![1.0, 0.0, 1.0]).unwrap();
        let roots = RootSet::new(vec![
            Root::new(0.0, 1.0, [255, 255, 255]),
            Root::new(0.0, -1.0, [128, 128, 128]),
        ]);
        let n = Newton::<f64>::new(&p, &roots, NewtonParams::default(), ());
        assert_eq!(classify(&n, 0.3, 2.0, &()).root_index(), Some(0));
        assert_eq!(classify(&n, -0.3, -2.0, &()).root_index(), Some(1));
    }

    #[test]
    fn backends_agree_on_a_root() {
        let fc = BigFloatContext::default();
        assert_eq!(
            classify(&Newton::<FBig>::default(), 0.0, 1.0, &fc),
            IterationResult::Converged {
                iterations: 0,
                root: 2
            }
        );
        assert_eq!(
            classify(&Newton::<f32>::default(), 2.0, 0.0, &()).root_index(),
            Some(0)
        );
        assert_eq!(
            classify(&Newton::<FBig>::default(), 2.0, 0.0, &fc),
            classify(&newton(), 2.0, 0.0, &())
        );
    }
}
