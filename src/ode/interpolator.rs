use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use tracing::debug;

use super::dense::DenseOutput;
use super::stages::combine;
use super::system::OdeStateAndDerivative;
use crate::traits::RealScalar;

/// Continuous view of one accepted step.
///
/// Holds its own copy of the stage derivatives and of both boundary states,
/// so it stays valid after the integrator has moved on. Evaluating it never
/// calls the right-hand side.
///
/// `θ = (t − t_prev) / h` is measured over the whole ("global") step. The
/// soft bounds, narrowed with [`restrict_step`](Self::restrict_step), only
/// decide which queries count as extrapolation.
///
/// ```
/// use kutta::ode::{ContinuousOutput, EmbeddedRungeKuttaIntegrator, DormandPrince54, FnSystem};
///
/// let ode = FnSystem::new(1, |_t: f64, y: &[f64], y_dot: &mut [f64]| y_dot[0] = -y[0]);
/// let integrator = EmbeddedRungeKuttaIntegrator::new(DormandPrince54, 1e-8, 1.0, 1e-10, 1e-10).unwrap();
/// let mut output = ContinuousOutput::new();
/// integrator.integrate_with(&ode, 0.0, &[1.0], 2.0, &mut output).unwrap();
///
/// let mid = output.interpolated_state(0.5).unwrap();
/// assert!((mid.state()[0] - (-0.5_f64).exp()).abs() < 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct RungeKuttaInterpolator<T> {
    forward: bool,
    h: T,
    y_dot_k: Vec<Vec<T>>,
    global_previous: OdeStateAndDerivative<T>,
    global_current: OdeStateAndDerivative<T>,
    soft_previous: OdeStateAndDerivative<T>,
    soft_current: OdeStateAndDerivative<T>,
    dense: Arc<DenseOutput<T>>,
}

impl<T: RealScalar> RungeKuttaInterpolator<T> {
    pub(crate) fn new(
        forward: bool,
        h: T,
        y_dot_k: Vec<Vec<T>>,
        previous: OdeStateAndDerivative<T>,
        current: OdeStateAndDerivative<T>,
        dense: Arc<DenseOutput<T>>,
    ) -> Self {
        Self {
            forward,
            h,
            y_dot_k,
            soft_previous: previous.clone(),
            soft_current: current.clone(),
            global_previous: previous,
            global_current: current,
            dense,
        }
    }

    /// Integration direction.
    #[inline]
    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Signed size of the whole step.
    #[inline]
    pub fn step_size(&self) -> T {
        self.h
    }

    /// Stage derivatives `k_0..k_{s-1}` of the step.
    #[inline]
    pub fn stage_derivatives(&self) -> &[Vec<T>] {
        &self.y_dot_k
    }

    /// State at the start of the whole step.
    #[inline]
    pub fn global_previous_state(&self) -> &OdeStateAndDerivative<T> {
        &self.global_previous
    }

    /// State at the end of the whole step.
    #[inline]
    pub fn global_current_state(&self) -> &OdeStateAndDerivative<T> {
        &self.global_current
    }

    /// Start of the (possibly restricted) valid range.
    #[inline]
    pub fn previous_state(&self) -> &OdeStateAndDerivative<T> {
        &self.soft_previous
    }

    /// End of the (possibly restricted) valid range.
    #[inline]
    pub fn current_state(&self) -> &OdeStateAndDerivative<T> {
        &self.soft_current
    }

    pub(crate) fn into_current_state(self) -> OdeStateAndDerivative<T> {
        self.global_current
    }

    /// Copy of this interpolator whose valid range is narrowed to
    /// `[previous, current]`.
    ///
    /// The polynomial is unchanged; queries outside the new range are
    /// reported as extrapolation.
    pub fn restrict_step(
        &self,
        previous: OdeStateAndDerivative<T>,
        current: OdeStateAndDerivative<T>,
    ) -> Self {
        Self {
            soft_previous: previous,
            soft_current: current,
            ..self.clone()
        }
    }

    /// State and derivative at `time`.
    ///
    /// The boundary states are returned as stored. Inside the step the
    /// first half is anchored on the start state, the second half on the
    /// end state.
    pub fn interpolated_state(&self, time: T) -> OdeStateAndDerivative<T> {
        if time == self.global_previous.time() {
            return self.global_previous.clone();
        }
        if time == self.global_current.time() {
            return self.global_current.clone();
        }

        if self.is_extrapolation(time) {
            debug!(
                t = time.to_f64(),
                previous = self.soft_previous.time().to_f64(),
                current = self.soft_current.time().to_f64(),
                "interpolating outside of step"
            );
        }

        let theta = self.theta(time);
        let half = T::ratio(1, 2);
        let state = if theta <= half {
            self.state_from_start(time)
        } else {
            self.state_from_end(time)
        };

        let n = state.len();
        let mut weights = vec![T::zero(); self.y_dot_k.len()];
        self.dense.derivative_weights(theta, &mut weights);
        let derivative = (0..n).map(|j| combine(&weights, &self.y_dot_k, j)).collect();

        OdeStateAndDerivative::new(time, state, derivative)
    }

    /// `y0 + θh Σ (P_i(θ)/θ) k_i`.
    pub(crate) fn state_from_start(&self, time: T) -> Vec<T> {
        let theta = self.theta(time);
        let theta_h = time - self.global_previous.time();
        let mut weights = vec![T::zero(); self.y_dot_k.len()];
        self.dense.forward_weights(theta, &mut weights);

        self.global_previous
            .state()
            .iter()
            .enumerate()
            .map(|(j, &y0)| y0 + theta_h * combine(&weights, &self.y_dot_k, j))
            .collect()
    }

    /// `y1 − (1−θ)h Σ Q_i(θ) k_i`.
    pub(crate) fn state_from_end(&self, time: T) -> Vec<T> {
        let theta = self.theta(time);
        let one_minus_theta_h = self.global_current.time() - time;
        let mut weights = vec![T::zero(); self.y_dot_k.len()];
        self.dense.backward_weights(theta, &mut weights);

        self.global_current
            .state()
            .iter()
            .enumerate()
            .map(|(j, &y1)| y1 - one_minus_theta_h * combine(&weights, &self.y_dot_k, j))
            .collect()
    }

    #[inline]
    fn theta(&self, time: T) -> T {
        if self.h == T::zero() {
            T::zero()
        } else {
            (time - self.global_previous.time()) / self.h
        }
    }

    /// Whether `time` lies outside the soft range of the step.
    pub(crate) fn is_extrapolation(&self, time: T) -> bool {
        let (lo, hi) = if self.forward {
            (self.soft_previous.time(), self.soft_current.time())
        } else {
            (self.soft_current.time(), self.soft_previous.time())
        };
        time < lo || time > hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode::{Midpoint, RungeKuttaMethod};

    // One midpoint step of y' = t from (0, 0) with h = 1; the extension
    // reproduces y = t²/2 exactly.
    fn midpoint_step() -> RungeKuttaInterpolator<f64> {
        let tab = Midpoint::tableau::<f64>();
        let k = vec![vec![0.0], vec![0.5]];
        RungeKuttaInterpolator::new(
            true,
            1.0,
            k,
            OdeStateAndDerivative::new(0.0, vec![0.0], vec![0.0]),
            OdeStateAndDerivative::new(1.0, vec![0.5], vec![1.0]),
            tab.dense.clone(),
        )
    }

    #[test]
    fn reproduces_quadratic() {
        let interp = midpoint_step();
        for &t in &[0.1, 0.25, 0.5, 0.75, 0.9] {
            let s = interp.interpolated_state(t);
            assert!((s.state()[0] - 0.5 * t * t).abs() < 1e-15, "t = {t}");
            // P_0' = 1 − 2θ, P_1' = 2θ: 2θ · 0.5 = t
            assert!((s.derivative()[0] - t).abs() < 1e-15, "t = {t}");
        }
    }

    #[test]
    fn boundaries_are_stored_states() {
        let interp = midpoint_step();
        assert_eq!(&interp.interpolated_state(0.0), interp.global_previous_state());
        assert_eq!(&interp.interpolated_state(1.0), interp.global_current_state());
    }

    #[test]
    fn branches_meet_in_the_middle() {
        let interp = midpoint_step();
        let a = interp.state_from_start(0.5);
        let b = interp.state_from_end(0.5);
        assert!((a[0] - b[0]).abs() < 1e-15);
    }

    #[test]
    fn restriction_keeps_polynomial() {
        let interp = midpoint_step();
        let lo = interp.interpolated_state(0.25);
        let hi = interp.interpolated_state(0.5);
        let narrow = interp.restrict_step(lo.clone(), hi.clone());

        assert_eq!(narrow.previous_state(), &lo);
        assert_eq!(narrow.current_state(), &hi);
        assert_eq!(narrow.global_previous_state().time(), 0.0);
        // Extrapolating outside the soft range still evaluates the same polynomial
        let s = narrow.interpolated_state(0.75);
        assert!((s.state()[0] - 0.5 * 0.75 * 0.75).abs() < 1e-15);
    }
}
