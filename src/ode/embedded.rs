use alloc::vec;
use alloc::vec::Vec;
use tracing::debug;

use super::adaptive::StepsizeControl;
use super::handler::{NoHandler, StepHandler};
use super::interpolator::RungeKuttaInterpolator;
use super::stages::{advance, combine, compute_stages, single_step, Run};
use super::system::{OdeStateAndDerivative, OdeSystem};
use super::tableau::{ButcherTableau, EmbeddedMethod};
use super::{OdeError, Solution};
use crate::traits::RealScalar;

/// Adaptive-step integrator for embedded Runge-Kutta pairs.
///
/// Each attempt computes all stages, propagates with `b` and estimates the
/// local error with `e = b − b̂`. Attempts with a normalized error of one
/// or more are rejected and retried with a smaller step; accepted steps set
/// the next step from the same error. See [`StepsizeControl`] for the
/// controller settings.
///
/// ```
/// use kutta::ode::{DormandPrince54, EmbeddedRungeKuttaIntegrator, FnSystem};
///
/// let ode = FnSystem::new(1, |_t: f64, y: &[f64], y_dot: &mut [f64]| y_dot[0] = -y[0]);
/// let integrator = EmbeddedRungeKuttaIntegrator::new(DormandPrince54, 1e-8, 1.0, 1e-10, 1e-10).unwrap();
/// let sol = integrator.integrate(&ode, 0.0, &[1.0], 1.0).unwrap();
/// assert!((sol.y[0] - (-1.0_f64).exp()).abs() < 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct EmbeddedRungeKuttaIntegrator<T> {
    tableau: ButcherTableau<T>,
    error_weights: Vec<T>,
    control: StepsizeControl<T>,
    max_evaluations: usize,
}

impl<T: RealScalar> EmbeddedRungeKuttaIntegrator<T> {
    /// Built-in pair with scalar tolerances.
    pub fn new<M: EmbeddedMethod>(
        _method: M,
        min_step: T,
        max_step: T,
        absolute_tolerance: T,
        relative_tolerance: T,
    ) -> Result<Self, OdeError> {
        let control = StepsizeControl::new(min_step, max_step, absolute_tolerance, relative_tolerance)?;
        Self::from_tableau(M::tableau(), M::error_weights(), control)
    }

    /// Built-in pair with per-component tolerances.
    pub fn with_vector_tolerances<M: EmbeddedMethod>(
        _method: M,
        min_step: T,
        max_step: T,
        absolute_tolerance: Vec<T>,
        relative_tolerance: Vec<T>,
    ) -> Result<Self, OdeError> {
        let control = StepsizeControl::with_vector_tolerances(
            min_step,
            max_step,
            absolute_tolerance,
            relative_tolerance,
        )?;
        Self::from_tableau(M::tableau(), M::error_weights(), control)
    }

    /// Arbitrary pair; `error_weights` must have one entry per stage.
    pub fn from_tableau(
        tableau: ButcherTableau<T>,
        error_weights: Vec<T>,
        control: StepsizeControl<T>,
    ) -> Result<Self, OdeError> {
        if error_weights.len() != tableau.stages() {
            return Err(OdeError::InvalidTableau);
        }
        Ok(Self {
            tableau,
            error_weights,
            control,
            max_evaluations: usize::MAX,
        })
    }

    #[inline]
    pub fn tableau(&self) -> &ButcherTableau<T> {
        &self.tableau
    }

    #[inline]
    pub fn error_weights(&self) -> &[T] {
        &self.error_weights
    }

    #[inline]
    pub fn control(&self) -> &StepsizeControl<T> {
        &self.control
    }

    /// Step bounds, tolerances and controller factors.
    #[inline]
    pub fn control_mut(&mut self) -> &mut StepsizeControl<T> {
        &mut self.control
    }

    #[inline]
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Cap the right-hand side evaluations of each run (unbounded by default).
    pub fn set_max_evaluations(&mut self, max_evaluations: usize) {
        self.max_evaluations = max_evaluations;
    }

    /// Normalized local error of a step from `y0` to `y1` of size `h`.
    ///
    /// RMS over the first `main_dimension` components of
    /// `h Σ e_k k_k[j] / (abs_j + rel_j max(|y0_j|, |y1_j|))`. The step is
    /// acceptable when the result is below one.
    pub fn estimate_error(&self, main_dimension: usize, y_dot_k: &[Vec<T>], y0: &[T], y1: &[T], h: T) -> T {
        if main_dimension == 0 {
            return T::zero();
        }
        let mut error = T::zero();
        for j in 0..main_dimension {
            let err_sum = combine(&self.error_weights, y_dot_k, j);
            let (abs, rel) = self.control.tolerance_at(j);
            let tol = abs + rel * y0[j].abs().max_of(y1[j].abs());
            let ratio = h * err_sum / tol;
            error = error + ratio * ratio;
        }
        (error / T::from_i64(main_dimension as i64)).sqrt()
    }

    /// Integrate `ode` from `(t0, y0)` to `final_time`.
    pub fn integrate<O>(&self, ode: &O, t0: T, y0: &[T], final_time: T) -> Result<Solution<T>, OdeError>
    where
        O: OdeSystem<T> + ?Sized,
    {
        self.integrate_with(ode, t0, y0, final_time, &mut NoHandler)
    }

    /// Integrate, passing every accepted step to `handler`.
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
        let main_dimension = ode.main_dimension();
        self.control.sanity_checks(main_dimension)?;

        let tableau = &self.tableau;
        let order = tableau.order();
        let mut run = Run::start(ode, tableau.name(), t0, y0, final_time, self.max_evaluations, handler)?;
        let forward = run.forward;

        let n = y0.len();
        let mut y_dot_k = vec![vec![T::zero(); n]; tableau.stages()];
        let mut y_tmp = vec![T::zero(); n];
        let mut y_end = vec![T::zero(); n];
        let mut h_new = T::zero();
        let mut first_time = true;

        while !run.is_last_step {
            let t = run.step_start.time();

            let (h, t_end, error) = loop {
                y_dot_k[0].copy_from_slice(run.step_start.derivative());

                if first_time {
                    let scale = self.control.scale(run.step_start.state(), main_dimension);
                    let evaluator = &mut run.evaluator;
                    h_new = self.control.initialize_step(
                        forward,
                        order,
                        &scale,
                        &run.step_start,
                        |tt, yy, out| evaluator.compute_derivatives(tt, yy, out),
                    )?;
                    debug!(h = h_new.to_f64(), "initial step size");
                    first_time = false;
                }

                let mut h = h_new;
                let mut t_end = t + h;
                run.is_last_step = false;
                if run.reaches_end(t_end) {
                    h = final_time - t;
                    t_end = final_time;
                    run.is_last_step = true;
                }
                run.step_size = h;

                let y = run.step_start.state();
                let evaluator = &mut run.evaluator;
                compute_stages(tableau, t, y, h, &mut y_dot_k, &mut y_tmp, |tt, yy, out| {
                    evaluator.compute_derivatives(tt, yy, out)
                })?;
                advance(y, h, &tableau.b, &y_dot_k, &mut y_end);

                let error = self.estimate_error(main_dimension, &y_dot_k, y, &y_end, h);
                if !error.is_finite() {
                    return Err(OdeError::StepNotFinite);
                }
                if error < T::one() {
                    break (h, t_end, error);
                }

                run.rejected += 1;
                debug!(
                    t = t.to_f64(),
                    h = h.to_f64(),
                    error = error.to_f64(),
                    "step rejected"
                );
                let factor = self.control.step_factor(error, order);
                h_new = self.control.filter_step(h * factor, forward, false)?;
            };

            let y_dot_end = match tableau.fsal {
                Some(k) => y_dot_k[k].clone(),
                None => {
                    let mut y_dot_end = vec![T::zero(); n];
                    run.evaluator.compute_derivatives(t_end, &y_end, &mut y_dot_end)?;
                    y_dot_end
                }
            };

            let interpolator = RungeKuttaInterpolator::new(
                forward,
                h,
                y_dot_k.clone(),
                run.step_start.clone(),
                OdeStateAndDerivative::new(t_end, y_end.clone(), y_dot_end),
                tableau.dense.clone(),
            );
            run.accept_step(interpolator, handler);

            if !run.is_last_step {
                let factor = self.control.step_factor(error, order);
                let scaled = h * factor;
                let next_is_last = run.reaches_end(t_end + scaled);
                h_new = self.control.filter_step(scaled, forward, next_is_last)?;
                if run.reaches_end(t_end + h_new) {
                    h_new = final_time - t_end;
                }
            }
        }

        Ok(run.finish(handler))
    }

    /// One step from `(t0, y0)` straight to `t` with the propagating
    /// weights, without error control or evaluation counting.
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
