//! Double-double arithmetic: an unevaluated sum of two `f64`s.
//!
//! Gives roughly 32 significant decimal digits using only `f64` hardware
//! operations (error-free transformations from Dekker and Knuth, in the form
//! used by Bailey's QD library). It exists so the integrators can run in
//! higher precision than `f64` without any code change.
//!
//! ```
//! use kutta::{DoubleDouble, RealScalar};
//!
//! let third = DoubleDouble::ratio(1, 3);
//! let err = (third * DoubleDouble::from(3.0) - DoubleDouble::from(1.0)).abs();
//! assert!(err.to_f64() < 1e-31);
//! ```

use core::ops::{Add, Div, Mul, Neg, Sub};
use num_traits::{Float, One, Zero};

use crate::traits::RealScalar;

/// Extended-precision real number `hi + lo` with `|lo| ≤ ulp(hi) / 2`.
///
/// Comparison is lexicographic on `(hi, lo)`, which is the numeric order
/// for normalized values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct DoubleDouble {
    hi: f64,
    lo: f64,
}

// ── Error-free transformations ───────────────────────────────────────

/// `a + b = s + e` exactly, assuming `|a| ≥ |b|`.
#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// `a + b = s + e` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

/// `a × b = p + e` exactly (needs a fused multiply-add).
#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let e = Float::mul_add(a, b, -p);
    (p, e)
}

// ── Constructors / accessors ─────────────────────────────────────────

impl DoubleDouble {
    /// Build from a high and low part, renormalizing.
    #[inline]
    pub fn new(hi: f64, lo: f64) -> Self {
        let (hi, lo) = two_sum(hi, lo);
        Self { hi, lo }
    }

    /// Leading component (the nearest `f64`).
    #[inline]
    pub fn hi(self) -> f64 {
        self.hi
    }

    /// Trailing correction term.
    #[inline]
    pub fn lo(self) -> f64 {
        self.lo
    }

    #[inline]
    fn from_parts(hi: f64, lo: f64) -> Self {
        let (hi, lo) = quick_two_sum(hi, lo);
        Self { hi, lo }
    }

    /// `self × b` for a plain `f64` factor.
    #[inline]
    fn mul_f64(self, b: f64) -> Self {
        let (p, e) = two_prod(self.hi, b);
        Self::from_parts(p, e + self.lo * b)
    }
}

impl From<f64> for DoubleDouble {
    #[inline]
    fn from(x: f64) -> Self {
        Self { hi: x, lo: 0.0 }
    }
}

// ── Operators ────────────────────────────────────────────────────────

impl Add for DoubleDouble {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s, e) = two_sum(self.hi, rhs.hi);
        let (t, f) = two_sum(self.lo, rhs.lo);
        let (s, e) = quick_two_sum(s, e + t);
        Self::from_parts(s, e + f)
    }
}

impl Sub for DoubleDouble {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for DoubleDouble {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p, e) = two_prod(self.hi, rhs.hi);
        Self::from_parts(p, e + (self.hi * rhs.lo + self.lo * rhs.hi))
    }
}

// Long division: three f64 quotient digits.
impl Div for DoubleDouble {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let q1 = self.hi / rhs.hi;
        let r = self - rhs.mul_f64(q1);
        let q2 = r.hi / rhs.hi;
        let r = r - rhs.mul_f64(q2);
        let q3 = r.hi / rhs.hi;
        Self::from_parts(q1, q2) + Self::from(q3)
    }
}

impl Neg for DoubleDouble {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Zero for DoubleDouble {
    #[inline]
    fn zero() -> Self {
        Self { hi: 0.0, lo: 0.0 }
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.hi == 0.0
    }
}

impl One for DoubleDouble {
    #[inline]
    fn one() -> Self {
        Self { hi: 1.0, lo: 0.0 }
    }
}

// ── RealScalar ───────────────────────────────────────────────────────

impl RealScalar for DoubleDouble {
    #[inline]
    fn abs(self) -> Self {
        if self.hi < 0.0 || (self.hi == 0.0 && self.lo < 0.0) {
            -self
        } else {
            self
        }
    }

    /// One Newton correction on top of the `f64` square root.
    fn sqrt(self) -> Self {
        if self.hi == 0.0 {
            return Self::zero();
        }
        if self.hi < 0.0 {
            return Self::from(f64::NAN);
        }
        let x = 1.0 / Float::sqrt(self.hi);
        let ax = Self::from(self.hi * x);
        let residual = (self - ax * ax).hi;
        let (s, e) = two_sum(ax.hi, residual * (x * 0.5));
        Self::from_parts(s, e)
    }

    /// Evaluated in `f64`; only used for step-size factors.
    #[inline]
    fn powf(self, n: Self) -> Self {
        Self::from(Float::powf(self.hi, n.hi))
    }

    #[inline]
    fn is_finite(self) -> bool {
        self.hi.is_finite() && self.lo.is_finite()
    }

    #[inline]
    fn from_f64(x: f64) -> Self {
        Self::from(x)
    }

    #[inline]
    fn from_i64(n: i64) -> Self {
        let hi = n as f64;
        let lo = (n as i128 - hi as i128) as f64;
        Self::from_parts(hi, lo)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self.hi + self.lo
    }
}

// ── Display ──────────────────────────────────────────────────────────

impl core::fmt::Display for DoubleDouble {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:e} + {:e}", self.hi, self.lo)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    type Dd = DoubleDouble;

    fn close(a: Dd, b: Dd, tol: f64) -> bool {
        (a - b).abs().to_f64() < tol
    }

    #[test]
    fn third_times_three() {
        let third = Dd::ratio(1, 3);
        assert!(close(third * Dd::from(3.0), Dd::one(), 1e-31));
        // f64 cannot represent 1/3 to this accuracy
        assert!(third.lo() != 0.0);
    }

    #[test]
    fn sqrt_two_squared() {
        let r = Dd::from(2.0).sqrt();
        assert!(close(r * r, Dd::from(2.0), 1e-30), "sqrt(2)^2 = {}", r * r);
        assert_eq!(r.hi(), core::f64::consts::SQRT_2);
    }

    #[test]
    fn sqrt_edge_cases() {
        assert_eq!(Dd::zero().sqrt(), Dd::zero());
        assert!(!Dd::from(-1.0).sqrt().is_finite());
    }

    #[test]
    fn division_matches_multiplication() {
        let a = Dd::ratio(22, 7);
        let b = Dd::ratio(355, 113);
        let q = a / b;
        assert!(close(q * b, a, 1e-30));
    }

    #[test]
    fn ordering_uses_low_part() {
        let a = Dd::new(1.0, 1e-20);
        let b = Dd::new(1.0, 2e-20);
        assert!(a < b);
        assert!(-b < -a);
        assert_eq!(a.max_of(b), b);
    }

    #[test]
    fn large_integers_are_exact() {
        let n = (1_i64 << 60) + 1;
        let x = Dd::from_i64(n);
        assert_eq!(x.hi(), (1_i64 << 60) as f64);
        assert_eq!(x.lo(), 1.0);
    }

    #[test]
    fn abs_and_neg() {
        let x = Dd::new(-2.0, 1e-18);
        assert_eq!(x.abs(), -x);
        assert_eq!(x.abs().hi(), 2.0);
    }

    #[test]
    fn cancellation_keeps_low_bits() {
        let a = Dd::from(1.0) + Dd::from(1e-25);
        let d = a - Dd::from(1.0);
        assert!((d.to_f64() - 1e-25).abs() < 1e-40);
    }
}
