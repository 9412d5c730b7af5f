use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};
use num_traits::{Float, One, Zero};

/// Field operations every state element supports.
///
/// Blanket-implemented for all types satisfying the bounds. The integrators
/// never need more than `+ - × ÷` and negation from this level.
pub trait Scalar:
    Copy
    + PartialEq
    + Debug
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
}

impl<T> Scalar for T where
    T: Copy
        + PartialEq
        + Debug
        + Zero
        + One
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
        + Neg<Output = T>
{
}

/// Ordered real scalar used by the Runge-Kutta engine.
///
/// Covers `f32`, `f64` and [`DoubleDouble`](crate::DoubleDouble). Butcher
/// coefficients are built from exact ratios with [`ratio`](Self::ratio), so a
/// wider type gets every digit of every coefficient rather than a rounded
/// `f64` constant.
///
/// `powf` is only used for step-size factors, where a few digits are plenty;
/// implementations may compute it at lower precision than the other
/// operations.
pub trait RealScalar: Scalar + PartialOrd + Send + Sync + 'static {
    /// Absolute value.
    fn abs(self) -> Self;

    /// Square root. Negative inputs give NaN (or the type's equivalent).
    fn sqrt(self) -> Self;

    /// `self` raised to a real power.
    fn powf(self, n: Self) -> Self;

    /// Whether the value is neither infinite nor NaN.
    fn is_finite(self) -> bool;

    /// Nearest representable value to an `f64`.
    fn from_f64(x: f64) -> Self;

    /// Integer conversion, exact whenever the type can hold `n`.
    fn from_i64(n: i64) -> Self;

    /// Lossy conversion for diagnostics and logging.
    fn to_f64(self) -> f64;

    /// The exact rational `p / q`, evaluated in `Self`.
    #[inline]
    fn ratio(p: i64, q: i64) -> Self {
        Self::from_i64(p) / Self::from_i64(q)
    }

    /// Larger of two values; `self` wins ties.
    #[inline]
    fn max_of(self, other: Self) -> Self {
        if other > self { other } else { self }
    }

    /// Smaller of two values; `self` wins ties.
    #[inline]
    fn min_of(self, other: Self) -> Self {
        if other < self { other } else { self }
    }
}

/// Concrete impls for hardware floats delegate to `num_traits::Float`.
macro_rules! impl_real_scalar_float {
    ($($t:ty),*) => {
        $(
            impl RealScalar for $t {
                #[inline] fn abs(self) -> $t { Float::abs(self) }
                #[inline] fn sqrt(self) -> $t { Float::sqrt(self) }
                #[inline] fn powf(self, n: $t) -> $t { Float::powf(self, n) }
                #[inline] fn is_finite(self) -> bool { Float::is_finite(self) }
                #[inline] fn from_f64(x: f64) -> $t { x as $t }
                #[inline] fn from_i64(n: i64) -> $t { n as $t }
                #[inline] fn to_f64(self) -> f64 { self as f64 }
            }
        )*
    };
}

impl_real_scalar_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_exact_for_representable_values() {
        assert_eq!(f64::ratio(3, 8), 0.375);
        assert_eq!(f32::ratio(-1, 4), -0.25);
    }

    #[test]
    fn max_min_of() {
        assert_eq!(2.0_f64.max_of(3.0), 3.0);
        assert_eq!(2.0_f64.min_of(3.0), 2.0);
        assert_eq!((-1.0_f64).max_of(-1.0), -1.0);
    }

    #[test]
    fn float_delegation() {
        assert_eq!(RealScalar::sqrt(16.0_f64), 4.0);
        assert_eq!(RealScalar::abs(-2.5_f32), 2.5);
        assert!(!RealScalar::is_finite(f64::NAN));
        assert!((RealScalar::powf(8.0_f64, 1.0 / 3.0) - 2.0).abs() < 1e-15);
    }
}
