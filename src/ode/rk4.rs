use alloc::vec;

use super::tableau::{ButcherTableau, RungeKuttaMethod};
use crate::traits::RealScalar;

/// The classical fourth-order Runge-Kutta method.
///
/// ```text
///   0 |
/// 1/2 | 1/2
/// 1/2 |  0   1/2
///   1 |  0    0    1
/// ----+--------------------
///     | 1/6  1/3  1/3  1/6
/// ```
///
/// Dense output is the cubic Hermite-like extension
/// `P_0 = θ − 3θ²/2 + 2θ³/3`, `P_1 = P_2 = θ² − 2θ³/3`, `P_3 = −θ²/2 + 2θ³/3`.
///
/// ```
/// use kutta::ode::{ClassicalRungeKutta, FnSystem, RungeKuttaIntegrator};
///
/// // dy/dt = -y (exponential decay)
/// let ode = FnSystem::new(1, |_t: f64, y: &[f64], y_dot: &mut [f64]| y_dot[0] = -y[0]);
/// let integrator = RungeKuttaIntegrator::new(ClassicalRungeKutta, 0.01).unwrap();
/// let y1 = integrator.single_step(&ode, 0.0, &[1.0], 0.01);
/// assert!((y1[0] - (-0.01_f64).exp()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassicalRungeKutta;

impl RungeKuttaMethod for ClassicalRungeKutta {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        let r = |p, q| T::ratio(p, q);
        let zero = T::zero();
        ButcherTableau::from_parts(
            "classical Runge-Kutta",
            4,
            vec![r(1, 2), r(1, 2), T::one()],
            vec![
                vec![r(1, 2)],
                vec![zero, r(1, 2)],
                vec![zero, zero, T::one()],
            ],
            vec![r(1, 6), r(1, 3), r(1, 3), r(1, 6)],
            None,
            vec![
                vec![T::one(), r(-3, 2), r(2, 3)],
                vec![zero, T::one(), r(-2, 3)],
                vec![zero, T::one(), r(-2, 3)],
                vec![zero, r(-1, 2), r(2, 3)],
            ],
        )
    }
}
