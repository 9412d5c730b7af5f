use alloc::vec;
use alloc::vec::Vec;

use super::tableau::{ButcherTableau, EmbeddedMethod, RungeKuttaMethod};
use crate::traits::RealScalar;

/// Dormand-Prince 5(4), seven stages with first-same-as-last.
///
/// The fifth-order solution is propagated; the embedded fourth-order one
/// only drives the error estimate. The last stage is evaluated at the new
/// state, so an accepted step costs six evaluations.
///
/// Dense output is Shampine's quartic extension.
///
/// J. R. Dormand and P. J. Prince, "A family of embedded Runge-Kutta
/// formulae", *J. Comput. Appl. Math.* 6 (1980), 19–26.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DormandPrince54;

impl RungeKuttaMethod for DormandPrince54 {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        let r = |p, q| T::ratio(p, q);
        let zero = T::zero();
        let one = T::one();

        let b = vec![
            r(35, 384),
            zero,
            r(500, 1113),
            r(125, 192),
            r(-2187, 6784),
            r(11, 84),
            zero,
        ];

        let a = vec![
            vec![r(1, 5)],
            vec![r(3, 40), r(9, 40)],
            vec![r(44, 45), r(-56, 15), r(32, 9)],
            vec![r(19372, 6561), r(-25360, 2187), r(64448, 6561), r(-212, 729)],
            vec![
                r(9017, 3168),
                r(-355, 33),
                r(46732, 5247),
                r(49, 176),
                r(-5103, 18656),
            ],
            b[..6].to_vec(),
        ];

        let d = [
            r(-12715105075, 11282082432),
            zero,
            r(87487479700, 32700410799),
            r(-10690763975, 1880347072),
            r(701980252875, 199316789632),
            r(-1453857185, 822651844),
            r(69997945, 29380423),
        ];

        // P_i = θ δ_i0 + θ²(3b_i − 2δ_i0 − δ_i6 + d_i)
        //     + θ³(−2b_i + δ_i0 + δ_i6 − 2d_i) + θ⁴ d_i
        let two = T::from_i64(2);
        let three = T::from_i64(3);
        let dense = (0..7)
            .map(|i| {
                let first = if i == 0 { one } else { zero };
                let last = if i == 6 { one } else { zero };
                vec![
                    first,
                    three * b[i] - two * first - last + d[i],
                    -two * b[i] + first + last - two * d[i],
                    d[i],
                ]
            })
            .collect();

        ButcherTableau::from_parts(
            "Dormand-Prince 5(4)",
            5,
            vec![r(1, 5), r(3, 10), r(4, 5), r(8, 9), one, one],
            a,
            b,
            Some(6),
            dense,
        )
    }
}

impl EmbeddedMethod for DormandPrince54 {
    fn error_weights<T: RealScalar>() -> Vec<T> {
        let r = |p, q| T::ratio(p, q);
        vec![
            r(71, 57600),
            T::zero(),
            r(-71, 16695),
            r(71, 1920),
            r(-17253, 339200),
            r(22, 525),
            r(-1, 40),
        ]
    }
}
