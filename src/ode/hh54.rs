use alloc::vec;
use alloc::vec::Vec;

use super::tableau::{ButcherTableau, EmbeddedMethod, RungeKuttaMethod};
use crate::traits::RealScalar;

/// Higham-Hall 5(4), seven stages with first-same-as-last.
///
/// Tuned for a smooth step-size sequence under the standard controller.
///
/// D. J. Higham and G. Hall, "Embedded Runge-Kutta formulae with stable
/// equilibrium states", *J. Comput. Appl. Math.* 29 (1990), 25–33.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighamHall54;

impl RungeKuttaMethod for HighamHall54 {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        let r = |p, q| T::ratio(p, q);
        let zero = T::zero();
        let one = T::one();

        let b = vec![
            r(1, 12),
            zero,
            r(27, 32),
            r(-4, 3),
            r(125, 96),
            r(5, 48),
            zero,
        ];

        let a = vec![
            vec![r(2, 9)],
            vec![r(1, 12), r(1, 4)],
            vec![r(1, 8), zero, r(3, 8)],
            vec![r(91, 500), r(-27, 100), r(78, 125), r(8, 125)],
            vec![r(-11, 20), r(27, 20), r(12, 5), r(-36, 5), T::from_i64(5)],
            b[..6].to_vec(),
        ];

        let dense = vec![
            vec![one, r(-15, 4), r(16, 3), r(-5, 2)],
            vec![zero],
            vec![zero, r(459, 32), r(-243, 8), r(135, 8)],
            vec![zero, T::from_i64(-22), r(152, 3), T::from_i64(-30)],
            vec![zero, r(375, 32), r(-625, 24), r(125, 8)],
            vec![zero, r(-5, 16), r(5, 12)],
            vec![zero],
        ];

        ButcherTableau::from_parts(
            "Higham-Hall 5(4)",
            5,
            vec![r(2, 9), r(1, 3), r(1, 2), r(3, 5), one, one],
            a,
            b,
            Some(6),
            dense,
        )
    }
}

impl EmbeddedMethod for HighamHall54 {
    fn error_weights<T: RealScalar>() -> Vec<T> {
        let r = |p, q| T::ratio(p, q);
        vec![
            r(-1, 20),
            T::zero(),
            r(81, 160),
            r(-6, 5),
            r(25, 32),
            r(1, 16),
            r(-1, 10),
        ]
    }
}
