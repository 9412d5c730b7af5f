use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use tracing::{debug, trace};

use super::handler::{StepAction, StepHandler};
use super::interpolator::RungeKuttaInterpolator;
use super::system::{OdeStateAndDerivative, OdeSystem};
use super::tableau::ButcherTableau;
use super::{OdeError, Solution};
use crate::traits::RealScalar;

/// Relative width under which two times are treated as the same instant.
pub(crate) const END_TOLERANCE: f64 = 1.0e-12;

/// Budget on the number of right-hand side evaluations of one run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EvaluationCounter {
    count: usize,
    max: usize,
}

impl EvaluationCounter {
    pub(crate) fn new(max: usize) -> Self {
        Self { count: 0, max }
    }

    #[inline]
    pub(crate) fn increment(&mut self) -> Result<(), OdeError> {
        if self.count >= self.max {
            return Err(OdeError::MaxEvaluationsExceeded { max: self.max });
        }
        self.count += 1;
        Ok(())
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

/// The ODE together with the evaluation budget of the current run.
pub(crate) struct Evaluator<'a, O: ?Sized> {
    ode: &'a O,
    counter: EvaluationCounter,
}

impl<'a, O: ?Sized> Evaluator<'a, O> {
    /// Counted evaluation of `f(t, y)` into `y_dot`.
    #[inline]
    pub(crate) fn compute_derivatives<T>(&mut self, t: T, y: &[T], y_dot: &mut [T]) -> Result<(), OdeError>
    where
        T: RealScalar,
        O: OdeSystem<T>,
    {
        self.counter.increment()?;
        self.ode.compute_derivatives(t, y, y_dot);
        Ok(())
    }

    #[inline]
    pub(crate) fn evaluations(&self) -> usize {
        self.counter.count()
    }
}

/// Mutable state of one `integrate` call.
///
/// Created on entry, dropped on return; nothing here outlives the call.
pub(crate) struct Run<'a, T, O: ?Sized> {
    pub(crate) evaluator: Evaluator<'a, O>,
    pub(crate) step_start: OdeStateAndDerivative<T>,
    pub(crate) step_size: T,
    pub(crate) is_last_step: bool,
    pub(crate) forward: bool,
    pub(crate) final_time: T,
    pub(crate) accepted: usize,
    pub(crate) rejected: usize,
    stopped: bool,
    end_tolerance: T,
}

impl<'a, T, O> Run<'a, T, O>
where
    T: RealScalar,
    O: OdeSystem<T> + ?Sized,
{
    /// Check the problem, then evaluate the initial derivative (counted) and
    /// hand it to the step handler.
    ///
    /// All checks happen before `f` is called for the first time.
    pub(crate) fn start<H: StepHandler<T> + ?Sized>(
        ode: &'a O,
        method: &'static str,
        t0: T,
        y0: &[T],
        final_time: T,
        max_evaluations: usize,
        handler: &mut H,
    ) -> Result<Self, OdeError> {
        let dimension = ode.dimension();
        if y0.len() != dimension {
            return Err(OdeError::DimensionMismatch {
                expected: dimension,
                found: y0.len(),
            });
        }
        if ode.main_dimension() > dimension {
            return Err(OdeError::DimensionMismatch {
                expected: dimension,
                found: ode.main_dimension(),
            });
        }

        if !t0.is_finite() || !final_time.is_finite() {
            return Err(OdeError::NonFiniteInput);
        }
        if y0.iter().any(|v| !v.is_finite()) {
            return Err(OdeError::NonFiniteInput);
        }

        let end_tolerance = T::from_f64(END_TOLERANCE) * t0.abs().max_of(final_time.abs());
        if (final_time - t0).abs() <= end_tolerance {
            return Err(OdeError::IntervalTooSmall);
        }

        debug!(
            method,
            dimension,
            t0 = t0.to_f64(),
            final_time = final_time.to_f64(),
            "starting integration"
        );

        let mut evaluator = Evaluator {
            ode,
            counter: EvaluationCounter::new(max_evaluations),
        };
        let mut y_dot0 = vec![T::zero(); dimension];
        evaluator.compute_derivatives(t0, y0, &mut y_dot0)?;
        let step_start = OdeStateAndDerivative::new(t0, y0.to_vec(), y_dot0);

        handler.init(&step_start, final_time);

        Ok(Self {
            evaluator,
            step_start,
            step_size: T::zero(),
            is_last_step: false,
            forward: final_time > t0,
            final_time,
            accepted: 0,
            rejected: 0,
            stopped: false,
            end_tolerance,
        })
    }

    /// Whether a step ending at `t` reaches (or passes) the final time.
    #[inline]
    pub(crate) fn reaches_end(&self, t: T) -> bool {
        let crossed = if self.forward {
            t >= self.final_time
        } else {
            t <= self.final_time
        };
        crossed || (self.final_time - t).abs() <= self.end_tolerance
    }

    /// Publish an accepted step and make its end the next step start.
    pub(crate) fn accept_step<H: StepHandler<T> + ?Sized>(
        &mut self,
        interpolator: RungeKuttaInterpolator<T>,
        handler: &mut H,
    ) {
        self.accepted += 1;
        trace!(
            t = interpolator.global_current_state().time().to_f64(),
            h = self.step_size.to_f64(),
            "step accepted"
        );

        if handler.handle_step(&interpolator) == StepAction::Stop {
            debug!(
                t = interpolator.global_current_state().time().to_f64(),
                "integration stopped by step handler"
            );
            self.stopped = true;
            self.is_last_step = true;
        }

        self.step_start = interpolator.into_current_state();
    }

    pub(crate) fn finish<H: StepHandler<T> + ?Sized>(self, handler: &mut H) -> Solution<T> {
        handler.finish(&self.step_start);
        let evals = self.evaluator.evaluations();
        let (t, y, y_dot) = self.step_start.into_parts();
        Solution {
            t,
            y,
            y_dot,
            evals,
            accepted: self.accepted,
            rejected: self.rejected,
            stopped: self.stopped,
        }
    }
}

/// Fill stages `1..s` of `y_dot_k`; stage 0 must already hold `f(t, y)`.
///
/// `y_tmp` is scratch of the state dimension. Each stage costs exactly one
/// call of `eval`; its first error ends the step.
pub(crate) fn compute_stages<T, F, E>(
    tableau: &ButcherTableau<T>,
    t: T,
    y: &[T],
    h: T,
    y_dot_k: &mut [Vec<T>],
    y_tmp: &mut [T],
    mut eval: F,
) -> Result<(), E>
where
    T: RealScalar,
    F: FnMut(T, &[T], &mut [T]) -> Result<(), E>,
{
    for k in 1..tableau.stages() {
        let (done, rest) = y_dot_k.split_at_mut(k);
        let row = &tableau.a[k - 1];

        for (j, tmp) in y_tmp.iter_mut().enumerate() {
            let mut sum = T::zero();
            for (a, stage) in row.iter().zip(done.iter()) {
                if *a != T::zero() {
                    sum = sum + *a * stage[j];
                }
            }
            *tmp = y[j] + h * sum;
        }

        eval(t + tableau.c[k - 1] * h, y_tmp, &mut rest[0])?;
    }
    Ok(())
}

/// `out = y + h Σ w_k k_k`.
pub(crate) fn advance<T: RealScalar>(y: &[T], h: T, weights: &[T], y_dot_k: &[Vec<T>], out: &mut [T]) {
    for (j, o) in out.iter_mut().enumerate() {
        *o = y[j] + h * combine(weights, y_dot_k, j);
    }
}

/// `Σ w_k k_k[j]`, skipping zero weights.
#[inline]
pub(crate) fn combine<T: RealScalar>(weights: &[T], y_dot_k: &[Vec<T>], j: usize) -> T {
    let mut sum = T::zero();
    for (w, stage) in weights.iter().zip(y_dot_k) {
        if *w != T::zero() {
            sum = sum + *w * stage[j];
        }
    }
    sum
}

/// One uncounted step of size `t − t0`, returning the state at `t`.
///
/// Touches nothing but local buffers, so it can run on many threads at once.
pub(crate) fn single_step<T, O>(tableau: &ButcherTableau<T>, ode: &O, t0: T, y0: &[T], t: T) -> Vec<T>
where
    T: RealScalar,
    O: OdeSystem<T> + ?Sized,
{
    let n = y0.len();
    assert_eq!(n, ode.dimension(), "state length does not match the ODE dimension");

    let h = t - t0;
    let mut y_dot_k = vec![vec![T::zero(); n]; tableau.stages()];
    let mut y_tmp = vec![T::zero(); n];
    ode.compute_derivatives(t0, y0, &mut y_dot_k[0]);

    let stages: Result<(), Infallible> =
        compute_stages(tableau, t0, y0, h, &mut y_dot_k, &mut y_tmp, |tt, yy, out| {
            ode.compute_derivatives(tt, yy, out);
            Ok(())
        });
    if let Err(never) = stages {
        match never {}
    }

    advance(y0, h, &tableau.b, &y_dot_k, &mut y_tmp);
    y_tmp
}
