use crate::complex::Complex;
use crate::fractal::{Classifier, EscapeParams, IterationResult};
use crate::real::Real;

/// The Mandelbrot set: `z_{n+1} = z_n² + c`, starting from `z₀ = 0`.
///
/// The point `c` is the coordinate on the complex plane. One instance is
/// built per render pass for the chosen backend; it carries the squared
/// escape radius already converted to `T`.
#[derive(Debug, Clone)]
pub struct Mandelbrot<T: Real> {
    params: EscapeParams,
    ctx: T::Context,
    escape_radius_sq: T,
}

impl<T: Real> Mandelbrot<T> {
    pub fn new(params: EscapeParams, ctx: T::Context) -> Self {
        let escape_radius_sq = T::from_f64_exact(params.escape_radius_sq(), &ctx);
        Self {
            params,
            ctx,
            escape_radius_sq,
        }
    }

    pub fn params(&self) -> &EscapeParams {
        &self.params
    }
}

impl<T: Real> Default for Mandelbrot<T>
where
    T::Context: Default,
{
    fn default() -> Self {
        Self::new(EscapeParams::default(), T::Context::default())
    }
}

impl<T: Real> Classifier<T> for Mandelbrot<T> {
    fn classify(&self, c: Complex<T>) -> crate::Result<IterationResult> {
        let mut z = Complex::zero(&self.ctx);

        for n in 0..self.params.max_iterations {
            // z = z² + c
            z = z.square() + c.clone();
            z.check_footprint(&self.ctx)?;

            if z.norm_sq() > self.escape_radius_sq {
                return Ok(IterationResult::Escaped { iterations: n });
            }
        }

        Ok(IterationResult::Bounded)
    }

    fn max_iterations(&self) -> u32 {
        self.params.max_iterations
    }
}
