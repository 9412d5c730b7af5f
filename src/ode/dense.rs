use alloc::vec::Vec;

use crate::traits::RealScalar;

/// Continuous-extension weights of a Runge-Kutta method.
///
/// Stage `i` contributes `P_i(θ) k_i` to the state at fraction `θ` of the
/// step, with `P_i(θ) = Σ_j p_ij θ^(j+1)` and `P_i(1) = b_i`. From the one
/// table of `p_ij` three evaluations are derived:
///
/// - forward:  `y(θ) = y0 + θh Σ (P_i(θ)/θ) k_i`
/// - backward: `y(θ) = y1 − (1−θ)h Σ Q_i(θ) k_i`, `Q_i = (b_i − P_i(θ)) / (1−θ)`
/// - derivative: `y'(θ) = Σ P_i'(θ) k_i`
///
/// `Q_i` is an exact polynomial (`P_i(1) = b_i`), its coefficients are
/// the suffix sums of `p_i`. Anchoring on the nearer step boundary keeps the
/// correction term small on each half of the step.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseOutput<T> {
    forward: Vec<Vec<T>>,
    backward: Vec<Vec<T>>,
    derivative: Vec<Vec<T>>,
}

/// Horner evaluation of `Σ c_j x^j`.
#[inline]
fn horner<T: RealScalar>(coeffs: &[T], x: T) -> T {
    coeffs.iter().rev().fold(T::zero(), |acc, &c| acc * x + c)
}

impl<T: RealScalar> DenseOutput<T> {
    /// Build from `weights[i][j]`, the coefficient of `θ^(j+1)` in `P_i(θ)`.
    pub fn new(weights: Vec<Vec<T>>) -> Self {
        let backward = weights
            .iter()
            .map(|p| {
                let mut q = p.clone();
                let mut acc = T::zero();
                for v in q.iter_mut().rev() {
                    acc = acc + *v;
                    *v = acc;
                }
                q
            })
            .collect();

        let derivative = weights
            .iter()
            .map(|p| {
                p.iter()
                    .enumerate()
                    .map(|(j, &c)| T::from_i64(j as i64 + 1) * c)
                    .collect()
            })
            .collect();

        Self {
            forward: weights,
            backward,
            derivative,
        }
    }

    /// Number of stages covered.
    #[inline]
    pub fn stages(&self) -> usize {
        self.forward.len()
    }

    /// Coefficients `p_ij` of stage `i`, lowest power (`θ`) first.
    #[inline]
    pub fn coefficients(&self, stage: usize) -> &[T] {
        &self.forward[stage]
    }

    /// `P_i(θ)`: the propagation weight of each stage at `θ`.
    pub fn weights(&self, theta: T) -> Vec<T> {
        self.forward.iter().map(|p| theta * horner(p, theta)).collect()
    }

    /// `P_i(θ) / θ` into `out`.
    pub(crate) fn forward_weights(&self, theta: T, out: &mut [T]) {
        for (o, p) in out.iter_mut().zip(&self.forward) {
            *o = horner(p, theta);
        }
    }

    /// `Q_i(θ)` into `out`.
    pub(crate) fn backward_weights(&self, theta: T, out: &mut [T]) {
        for (o, q) in out.iter_mut().zip(&self.backward) {
            *o = horner(q, theta);
        }
    }

    /// `P_i'(θ)` into `out`.
    pub(crate) fn derivative_weights(&self, theta: T, out: &mut [T]) {
        for (o, d) in out.iter_mut().zip(&self.derivative) {
            *o = horner(d, theta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    // Midpoint extension: P_0 = θ − θ², P_1 = θ²
    fn midpoint() -> DenseOutput<f64> {
        DenseOutput::new(vec![vec![1.0, -1.0], vec![0.0, 1.0]])
    }

    #[test]
    fn weights_at_end_are_propagation_weights() {
        let d = midpoint();
        assert_eq!(d.weights(1.0), vec![0.0, 1.0]);
        assert_eq!(d.weights(0.0), vec![0.0, 0.0]);
    }

    #[test]
    fn backward_weights_are_suffix_sums() {
        // Q_0 = (0 − θ + θ²)/(1−θ) = −θ, Q_1 = (1 − θ²)/(1−θ) = 1 + θ
        let d = midpoint();
        let mut q = [0.0; 2];
        d.backward_weights(0.25, &mut q);
        assert!((q[0] + 0.25).abs() < 1e-15);
        assert!((q[1] - 1.25).abs() < 1e-15);
    }

    #[test]
    fn derivative_weights() {
        let d = midpoint();
        let mut w = [0.0; 2];
        d.derivative_weights(0.5, &mut w);
        assert_eq!(w, [0.0, 1.0]);
        d.derivative_weights(0.0, &mut w);
        assert_eq!(w, [1.0, 0.0]);
    }

    #[test]
    fn forward_and_backward_agree() {
        let d = midpoint();
        let b = [0.0, 1.0];
        let theta = 0.3;
        let mut f = [0.0; 2];
        let mut q = [0.0; 2];
        d.forward_weights(theta, &mut f);
        d.backward_weights(theta, &mut q);
        for i in 0..2 {
            let from_start = theta * f[i];
            let from_end = b[i] - (1.0 - theta) * q[i];
            assert!((from_start - from_end).abs() < 1e-15);
        }
    }
}
