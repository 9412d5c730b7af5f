use alloc::sync::Arc;
use alloc::vec::Vec;

use super::dense::DenseOutput;
use super::OdeError;
use crate::traits::RealScalar;

/// Explicit Runge-Kutta coefficients plus their continuous extension.
///
/// For an `s`-stage method:
///
/// - `c` has `s − 1` entries (stage 0 is always at the step start),
/// - `a` is strictly lower triangular, stored as `s − 1` rows where row `i`
///   has `i + 1` entries (the coupling of stage `i + 1` to stages `0..=i`),
/// - `b` has `s` entries and sums to one.
///
/// `fsal` names the stage whose derivative equals `f` at the step end, so
/// the engine can reuse it instead of evaluating again.
#[derive(Debug, Clone)]
pub struct ButcherTableau<T> {
    pub(crate) name: &'static str,
    pub(crate) order: usize,
    pub(crate) c: Vec<T>,
    pub(crate) a: Vec<Vec<T>>,
    pub(crate) b: Vec<T>,
    pub(crate) fsal: Option<usize>,
    pub(crate) dense: Arc<DenseOutput<T>>,
}

impl<T: RealScalar> ButcherTableau<T> {
    /// Build a user-defined tableau, checking shapes and consistency.
    ///
    /// `dense[i][j]` is the coefficient of `θ^(j+1)` in the continuous
    /// weight of stage `i` (see [`DenseOutput`]).
    ///
    /// Besides the shapes, the weights must sum to one, each row of `a` must
    /// sum to its `c`, every dense weight must reach `b_i` at `θ = 1`, and a
    /// FSAL stage must sit at the step end with its row of `a` equal to `b`.
    /// Violations return [`OdeError::InvalidTableau`].
    ///
    /// ```
    /// use kutta::ode::ButcherTableau;
    ///
    /// // Heun's method, with linear dense output
    /// let heun = ButcherTableau::new(
    ///     "Heun", 2,
    ///     vec![1.0_f64],
    ///     vec![vec![1.0]],
    ///     vec![0.5, 0.5],
    ///     None,
    ///     vec![vec![0.5], vec![0.5]],
    /// ).unwrap();
    /// assert_eq!(heun.stages(), 2);
    /// ```
    pub fn new(
        name: &'static str,
        order: usize,
        c: Vec<T>,
        a: Vec<Vec<T>>,
        b: Vec<T>,
        fsal: Option<usize>,
        dense: Vec<Vec<T>>,
    ) -> Result<Self, OdeError> {
        let stages = b.len();
        if stages == 0 || order == 0 || c.len() + 1 != stages || a.len() + 1 != stages {
            return Err(OdeError::InvalidTableau);
        }
        if a.iter().enumerate().any(|(i, row)| row.len() != i + 1) {
            return Err(OdeError::InvalidTableau);
        }
        if dense.len() != stages || fsal.map_or(false, |k| k == 0 || k >= stages) {
            return Err(OdeError::InvalidTableau);
        }

        if !close(sum(&b), T::one()) {
            return Err(OdeError::InvalidTableau);
        }
        if a.iter().zip(&c).any(|(row, &ci)| !close(sum(row), ci)) {
            return Err(OdeError::InvalidTableau);
        }
        if dense.iter().zip(&b).any(|(p, &bi)| !close(sum(p), bi)) {
            return Err(OdeError::InvalidTableau);
        }
        if let Some(k) = fsal {
            let row = &a[k - 1];
            let at_end = close(c[k - 1], T::one());
            let matches_b = row.iter().zip(&b).all(|(&x, &y)| close(x, y))
                && b[row.len()..].iter().all(|&y| close(y, T::zero()));
            if !at_end || !matches_b {
                return Err(OdeError::InvalidTableau);
            }
        }

        Ok(Self::from_parts(name, order, c, a, b, fsal, dense))
    }

    /// Unchecked constructor for the built-in methods.
    pub(crate) fn from_parts(
        name: &'static str,
        order: usize,
        c: Vec<T>,
        a: Vec<Vec<T>>,
        b: Vec<T>,
        fsal: Option<usize>,
        dense: Vec<Vec<T>>,
    ) -> Self {
        Self {
            name,
            order,
            c,
            a,
            b,
            fsal,
            dense: Arc::new(DenseOutput::new(dense)),
        }
    }

    /// Number of stages `s`.
    #[inline]
    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// Method name, used in log output.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Order of the propagated solution.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Stage time fractions `c_1..c_{s-1}`.
    #[inline]
    pub fn c(&self) -> &[T] {
        &self.c
    }

    /// Stage coupling rows.
    #[inline]
    pub fn a(&self) -> &[Vec<T>] {
        &self.a
    }

    /// Propagation weights.
    #[inline]
    pub fn b(&self) -> &[T] {
        &self.b
    }

    /// First-same-as-last stage, if any.
    #[inline]
    pub fn fsal(&self) -> Option<usize> {
        self.fsal
    }

    /// Continuous-extension weights.
    #[inline]
    pub fn dense_output(&self) -> &DenseOutput<T> {
        &self.dense
    }
}

fn sum<T: RealScalar>(values: &[T]) -> T {
    values.iter().fold(T::zero(), |acc, &v| acc + v)
}

/// Equality up to roundoff in the coefficients, scaled by their size.
fn close<T: RealScalar>(x: T, y: T) -> bool {
    let scale = T::one().max_of(x.abs()).max_of(y.abs());
    (x - y).abs() <= T::from_f64(1.0e-12) * scale
}

/// A fixed explicit Runge-Kutta method.
///
/// Implemented by zero-sized markers ([`ClassicalRungeKutta`](super::ClassicalRungeKutta),
/// [`DormandPrince54`](super::DormandPrince54), ...). The tableau is built in
/// the requested scalar type, so exact ratios are rounded once, in `T`.
pub trait RungeKuttaMethod {
    /// Coefficients and continuous extension in scalar type `T`.
    fn tableau<T: RealScalar>() -> ButcherTableau<T>;
}

/// A method with an embedded lower-order solution.
pub trait EmbeddedMethod: RungeKuttaMethod {
    /// `e_i = b_i − b̂_i`: the local error estimate is `h Σ e_i k_i`.
    fn error_weights<T: RealScalar>() -> Vec<T>;
}
