use alloc::vec::Vec;

use super::interpolator::RungeKuttaInterpolator;
use super::system::OdeStateAndDerivative;
use super::OdeError;
use crate::traits::RealScalar;

/// What the integrator should do after a step has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// Keep integrating.
    Continue,
    /// End the run at the end of this step.
    Stop,
}

/// Observer of accepted steps.
///
/// Closures `FnMut(&RungeKuttaInterpolator<T>) -> StepAction` are handlers.
///
/// ```
/// use kutta::ode::{FnSystem, RungeKuttaIntegrator, ClassicalRungeKutta, StepAction};
///
/// let ode = FnSystem::new(1, |_t: f64, _y: &[f64], y_dot: &mut [f64]| y_dot[0] = 1.0);
/// let integrator = RungeKuttaIntegrator::new(ClassicalRungeKutta, 0.25).unwrap();
///
/// let mut ends = Vec::new();
/// let mut record = |step: &kutta::ode::RungeKuttaInterpolator<f64>| {
///     ends.push(step.current_state().time());
///     StepAction::Continue
/// };
/// integrator.integrate_with(&ode, 0.0, &[0.0], 1.0, &mut record).unwrap();
/// assert_eq!(ends, vec![0.25, 0.5, 0.75, 1.0]);
/// ```
pub trait StepHandler<T: RealScalar> {
    /// Called once, after the initial derivative is known.
    fn init(&mut self, _initial_state: &OdeStateAndDerivative<T>, _final_time: T) {}

    /// Called for every accepted step, in order.
    fn handle_step(&mut self, interpolator: &RungeKuttaInterpolator<T>) -> StepAction;

    /// Called once with the state the run ends on.
    fn finish(&mut self, _final_state: &OdeStateAndDerivative<T>) {}
}

impl<T, F> StepHandler<T> for F
where
    T: RealScalar,
    F: FnMut(&RungeKuttaInterpolator<T>) -> StepAction,
{
    fn handle_step(&mut self, interpolator: &RungeKuttaInterpolator<T>) -> StepAction {
        self(interpolator)
    }
}

/// Handler that ignores every step.
pub(crate) struct NoHandler;

impl<T: RealScalar> StepHandler<T> for NoHandler {
    fn handle_step(&mut self, _interpolator: &RungeKuttaInterpolator<T>) -> StepAction {
        StepAction::Continue
    }
}

/// Step handler keeping every step of a run for later dense queries.
#[derive(Debug, Clone, Default)]
pub struct ContinuousOutput<T> {
    steps: Vec<RungeKuttaInterpolator<T>>,
}

impl<T: RealScalar> ContinuousOutput<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Recorded steps, in integration order.
    #[inline]
    pub fn steps(&self) -> &[RungeKuttaInterpolator<T>] {
        &self.steps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start time of the recorded range.
    pub fn initial_time(&self) -> Option<T> {
        self.steps.first().map(|s| s.global_previous_state().time())
    }

    /// End time of the recorded range.
    pub fn final_time(&self) -> Option<T> {
        self.steps.last().map(|s| s.global_current_state().time())
    }

    /// State and derivative at any `time` covered by the run.
    pub fn interpolated_state(&self, time: T) -> Result<OdeStateAndDerivative<T>, OdeError> {
        let (first, last) = match (self.steps.first(), self.steps.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(OdeError::NoDenseOutput),
        };

        let forward = first.is_forward();
        let t0 = first.global_previous_state().time();
        let t1 = last.global_current_state().time();
        let (lo, hi) = if forward { (t0, t1) } else { (t1, t0) };
        if time < lo || time > hi {
            return Err(OdeError::InterpOutOfBounds);
        }

        // First step whose end is not before `time` in integration order
        let idx = if forward {
            self.steps
                .partition_point(|s| s.global_current_state().time() < time)
        } else {
            self.steps
                .partition_point(|s| s.global_current_state().time() > time)
        };
        let idx = idx.min(self.steps.len() - 1);

        Ok(self.steps[idx].interpolated_state(time))
    }
}

impl<T: RealScalar> StepHandler<T> for ContinuousOutput<T> {
    fn init(&mut self, _initial_state: &OdeStateAndDerivative<T>, _final_time: T) {
        self.steps.clear();
    }

    fn handle_step(&mut self, interpolator: &RungeKuttaInterpolator<T>) -> StepAction {
        self.steps.push(interpolator.clone());
        StepAction::Continue
    }
}
