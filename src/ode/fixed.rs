use alloc::vec;
use alloc::vec::Vec;

use super::handler::{NoHandler, StepHandler};
use super::interpolator::RungeKuttaInterpolator;
use super::stages::{advance, compute_stages, single_step, Run};
use super::system::{OdeStateAndDerivative, OdeSystem};
use super::tableau::{ButcherTableau, RungeKuttaMethod};
use super::{OdeError, Solution};
use crate::traits::RealScalar;

/// Fixed-step explicit Runge-Kutta integrator.
///
/// Every step has the same magnitude except the last, which is shortened to
/// land exactly on the final time. A step costs `s − 1` stage evaluations
/// plus one at its end (which becomes the first stage of the next step).
///
/// ```
/// use kutta::ode::{ClassicalRungeKutta, FnSystem, RungeKuttaIntegrator};
///
/// // Harmonic oscillator: y'' = -y  →  [y, y']
/// let ode = FnSystem::new(2, |_t: f64, y: &[f64], y_dot: &mut [f64]| {
///     y_dot[0] = y[1];
///     y_dot[1] = -y[0];
/// });
/// let integrator = RungeKuttaIntegrator::new(ClassicalRungeKutta, 0.001).unwrap();
/// let sol = integrator.integrate(&ode, 0.0, &[1.0, 0.0], std::f64::consts::TAU).unwrap();
/// assert!((sol.y[0] - 1.0).abs() < 1e-8);
/// assert!(sol.y[1].abs() < 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct RungeKuttaIntegrator<T> {
    tableau: ButcherTableau<T>,
    step: T,
    max_evaluations: usize,
}

impl<T: RealScalar> RungeKuttaIntegrator<T> {
    /// Integrator for a built-in method with step magnitude `step`.
    pub fn new<M: RungeKuttaMethod>(_method: M, step: T) -> Result<Self, OdeError> {
        Self::from_tableau(M::tableau(), step)
    }

    /// Integrator for an arbitrary tableau.
    pub fn from_tableau(tableau: ButcherTableau<T>, step: T) -> Result<Self, OdeError> {
        let step = step.abs();
        if step == T::zero() || !step.is_finite() {
            return Err(OdeError::InvalidStepSize);
        }
        Ok(Self {
            tableau,
            step,
            max_evaluations: usize::MAX,
        })
    }

    #[inline]
    pub fn tableau(&self) -> &ButcherTableau<T> {
        &self.tableau
    }

    /// Step magnitude.
    #[inline]
    pub fn step(&self) -> T {
        self.step
    }

    #[inline]
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Cap the right-hand side evaluations of each run (unbounded by default).
    pub fn set_max_evaluations(&mut self, max_evaluations: usize) {
        self.max_evaluations = max_evaluations;
    }

    /// Integrate `ode` from `(t0, y0)` to `final_time`.
    pub fn integrate<O>(&self, ode: &O, t0: T, y0: &[T], final_time: T) -> Result<Solution<T>, OdeError>
    where
        O: OdeSystem<T> + ?Sized,
    {
        self.integrate_with(ode, t0, y0, final_time, &mut NoHandler)
    }

    /// Integrate, passing every step to `handler`.
    pub fn integrate_with<O, H>(
        &self,
        ode: &O,
        t0: T,
        y0: &[T],
        final_time: T,
        handler: &mut H,
    ) -> Result<Solution<T>, OdeError>
    where
        O: OdeSystem<T> + ?Sized,
        H: StepHandler<T> + ?Sized,
    {
        let tableau = &self.tableau;
        let mut run = Run::start(ode, tableau.name(), t0, y0, final_time, self.max_evaluations, handler)?;

        let n = y0.len();
        let mut y_dot_k = vec![vec![T::zero(); n]; tableau.stages()];
        let mut y_tmp = vec![T::zero(); n];
        let step = if run.forward { self.step } else { -self.step };

        while !run.is_last_step {
            let t = run.step_start.time();
            let mut h = step;
            let mut t_end = t + h;
            if run.reaches_end(t_end) {
                h = final_time - t;
                t_end = final_time;
                run.is_last_step = true;
            }
            run.step_size = h;

            y_dot_k[0].copy_from_slice(run.step_start.derivative());
            let y = run.step_start.state();
            let evaluator = &mut run.evaluator;
            compute_stages(tableau, t, y, h, &mut y_dot_k, &mut y_tmp, |tt, yy, out| {
                evaluator.compute_derivatives(tt, yy, out)
            })?;

            let mut y_end = vec![T::zero(); n];
            advance(y, h, &tableau.b, &y_dot_k, &mut y_end);

            let y_dot_end = match tableau.fsal {
                Some(k) => y_dot_k[k].clone(),
                None => {
                    let mut y_dot_end = vec![T::zero(); n];
                    run.evaluator.compute_derivatives(t_end, &y_end, &mut y_dot_end)?;
                    y_dot_end
                }
            };

            let interpolator = RungeKuttaInterpolator::new(
                run.forward,
                h,
                y_dot_k.clone(),
                run.step_start.clone(),
                OdeStateAndDerivative::new(t_end, y_end, y_dot_end),
                tableau.dense.clone(),
            );
            run.accept_step(interpolator, handler);
        }

        Ok(run.finish(handler))
    }

    /// One step from `(t0, y0)` straight to `t`, without evaluation counting.
    ///
    /// Holds no state between calls: safe to call concurrently when `ode` is
    /// `Sync`.
    ///
    /// # Panics
    ///
    /// If `y0.len()` differs from `ode.dimension()`.
    pub fn single_step<O>(&self, ode: &O, t0: T, y0: &[T], t: T) -> Vec<T>
    where
        O: OdeSystem<T> + ?Sized,
    {
        single_step(&self.tableau, ode, t0, y0, t)
    }
}
