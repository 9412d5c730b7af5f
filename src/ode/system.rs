use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::traits::RealScalar;

/// First-order ODE system `y' = f(t, y)`.
///
/// `compute_derivatives` takes `&self`: integrators call it from a single
/// thread per run, and [`single_step`](super::RungeKuttaIntegrator::single_step)
/// may be called from several threads at once when the system is `Sync`.
///
/// ```
/// use kutta::ode::OdeSystem;
///
/// struct Decay { rate: f64 }
///
/// impl OdeSystem<f64> for Decay {
///     fn dimension(&self) -> usize { 1 }
///     fn compute_derivatives(&self, _t: f64, y: &[f64], y_dot: &mut [f64]) {
///         y_dot[0] = -self.rate * y[0];
///     }
/// }
/// ```
pub trait OdeSystem<T: RealScalar> {
    /// Length of the full state vector.
    fn dimension(&self) -> usize;

    /// Leading part of the state owned by the primary equations.
    ///
    /// Only these components enter the local error norm and the initial
    /// step heuristic; trailing secondary components (variational
    /// equations, for example) are propagated but not error-controlled.
    fn main_dimension(&self) -> usize {
        self.dimension()
    }

    /// Write `f(t, y)` into `y_dot`.
    fn compute_derivatives(&self, t: T, y: &[T], y_dot: &mut [T]);
}

impl<T: RealScalar, O: OdeSystem<T> + ?Sized> OdeSystem<T> for &O {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn main_dimension(&self) -> usize {
        (**self).main_dimension()
    }

    fn compute_derivatives(&self, t: T, y: &[T], y_dot: &mut [T]) {
        (**self).compute_derivatives(t, y, y_dot)
    }
}

/// Closure-backed [`OdeSystem`].
///
/// ```
/// use kutta::ode::{FnSystem, OdeSystem};
///
/// let oscillator = FnSystem::new(2, |_t: f64, y: &[f64], y_dot: &mut [f64]| {
///     y_dot[0] = y[1];
///     y_dot[1] = -y[0];
/// });
/// assert_eq!(oscillator.dimension(), 2);
/// ```
#[derive(Clone)]
pub struct FnSystem<T, F> {
    dimension: usize,
    main_dimension: usize,
    f: F,
    _scalar: PhantomData<fn() -> T>,
}

impl<T, F> FnSystem<T, F>
where
    T: RealScalar,
    F: Fn(T, &[T], &mut [T]),
{
    /// Wrap `f` as a system of `dimension` equations.
    pub fn new(dimension: usize, f: F) -> Self {
        Self {
            dimension,
            main_dimension: dimension,
            f,
            _scalar: PhantomData,
        }
    }

    /// Restrict error control to the first `main_dimension` components.
    pub fn with_main_dimension(mut self, main_dimension: usize) -> Self {
        self.main_dimension = main_dimension;
        self
    }
}

impl<T, F> OdeSystem<T> for FnSystem<T, F>
where
    T: RealScalar,
    F: Fn(T, &[T], &mut [T]),
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn main_dimension(&self) -> usize {
        self.main_dimension
    }

    fn compute_derivatives(&self, t: T, y: &[T], y_dot: &mut [T]) {
        (self.f)(t, y, y_dot)
    }
}

/// Snapshot of a trajectory point: time, state and derivative.
///
/// Owned value; interpolators and handlers keep their own copies so a later
/// step can never alter an earlier snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OdeStateAndDerivative<T> {
    time: T,
    state: Vec<T>,
    derivative: Vec<T>,
}

impl<T: RealScalar> OdeStateAndDerivative<T> {
    /// Bundle a state with its derivative.
    ///
    /// # Panics
    ///
    /// If `state` and `derivative` differ in length.
    pub fn new(time: T, state: Vec<T>, derivative: Vec<T>) -> Self {
        assert_eq!(state.len(), derivative.len(), "state/derivative length mismatch");
        Self {
            time,
            state,
            derivative,
        }
    }

    /// Independent variable value.
    #[inline]
    pub fn time(&self) -> T {
        self.time
    }

    /// State vector `y`.
    #[inline]
    pub fn state(&self) -> &[T] {
        &self.state
    }

    /// Derivative vector `y'`.
    #[inline]
    pub fn derivative(&self) -> &[T] {
        &self.derivative
    }

    /// State dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.state.len()
    }

    /// Decompose into `(time, state, derivative)`.
    pub fn into_parts(self) -> (T, Vec<T>, Vec<T>) {
        (self.time, self.state, self.derivative)
    }
}
