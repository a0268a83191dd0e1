use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::real::Real;

/// A complex number over any [`Real`] backend.
///
/// Operators take their operands by value. For the fixed-width backends
/// that is a plain copy; for the arbitrary-precision ones the loops clone
/// explicitly where a value is reused, which keeps allocation visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T: Real> Complex<T> {
    #[inline]
    pub fn new(re: T, im: T) -> Self {
        Self { re, im }
    }

    /// Build a value from `f64` components in the given context.
    pub fn from_f64(re: f64, im: f64, ctx: &T::Context) -> Self {
        Self::new(T::from_f64(re, ctx), T::from_f64(im, ctx))
    }

    pub fn zero(ctx: &T::Context) -> Self {
        Self::from_f64(0.0, 0.0, ctx)
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(&self) -> T {
        self.re.clone() * self.re.clone() + self.im.clone() * self.im.clone()
    }

    /// `z²`, cheaper than `z * z` by one multiplication.
    #[inline]
    pub fn square(&self) -> Self {
        let re = self.re.clone() * self.re.clone() - self.im.clone() * self.im.clone();
        let two_re = self.re.clone() + self.re.clone();
        Self::new(re, two_re * self.im.clone())
    }

    /// Both components exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    /// Run the backend's resource guard on both components.
    pub fn check_footprint(&self, ctx: &T::Context) -> crate::Result<()> {
        self.re.check_footprint(ctx)?;
        self.im.check_footprint(ctx)
    }

    /// Lossy projection to `f64` components.
    pub fn to_f64(&self) -> Complex<f64> {
        Complex {
            re: self.re.to_f64(),
            im: self.im.to_f64(),
        }
    }
}

impl Complex<f64> {
    /// Convert a parameter point (a root, say) into another backend
    /// through [`Real::from_f64_exact`].
    pub fn convert<T: Real>(&self, ctx: &T::Context) -> Complex<T> {
        Complex::new(T::from_f64_exact(self.re, ctx), T::from_f64_exact(self.im, ctx))
    }
}

impl<T> Copy for Complex<T> where T: Copy {}

// -- Arithmetic operators --

impl<T: Real> Add for Complex<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl<T: Real> Sub for Complex<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl<T: Real> Mul for Complex<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        // (a + bi)(c + di) = (ac - bd) + (ad + bc)i
        let (a, b) = (self.re, self.im);
        let (c, d) = (rhs.re, rhs.im);
        Self {
            re: a.clone() * c.clone() - b.clone() * d.clone(),
            im: a * d + b * c,
        }
    }
}

impl<T: Real> Div for Complex<T> {
    type Output = Self;

    /// Textbook division. The caller guarantees `rhs` is non-zero; for
    /// the exact backends a zero divisor panics.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        // (a + bi)/(c + di) = ((ac + bd) + (bc - ad)i) / (c² + d²)
        let denom = rhs.norm_sq();
        let (a, b) = (self.re, self.im);
        let (c, d) = (rhs.re, rhs.im);
        let re = a.clone() * c.clone() + b.clone() * d.clone();
        let im = b * c - a * d;
        Self {
            re: re / denom.clone(),
            im: im / denom,
        }
    }
}

impl<T: Real> Neg for Complex<T> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}
