use alloc::vec;

use super::tableau::{ButcherTableau, RungeKuttaMethod};
use crate::traits::RealScalar;

/// Luther's sixth-order method (seven stages).
///
/// The nodes `(7 ∓ √21)/14` are the interior Lobatto points, so several
/// coupling coefficients carry `√21`; they are evaluated in the scalar type.
///
/// H. A. Luther, "An explicit sixth-order Runge-Kutta formula",
/// *Mathematics of Computation* 22 (1968), 434–436.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Luther;

impl RungeKuttaMethod for Luther {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        let r = |p, q| T::ratio(p, q);
        let n = |p| T::from_i64(p);
        let zero = T::zero();
        let one = T::one();
        let q = n(21).sqrt();

        let c = vec![
            one,
            r(1, 2),
            r(2, 3),
            (n(7) - q) / n(14),
            (n(7) + q) / n(14),
            one,
        ];

        let a = vec![
            vec![one],
            vec![r(3, 8), r(1, 8)],
            vec![r(8, 27), r(2, 27), r(8, 27)],
            vec![
                (n(-21) + n(9) * q) / n(392),
                (n(-56) + n(8) * q) / n(392),
                (n(336) - n(48) * q) / n(392),
                (n(-63) + n(3) * q) / n(392),
            ],
            vec![
                (n(-1155) - n(255) * q) / n(1960),
                (n(-280) - n(40) * q) / n(1960),
                -n(320) * q / n(1960),
                (n(63) + n(363) * q) / n(1960),
                (n(2352) + n(392) * q) / n(1960),
            ],
            vec![
                (n(330) + n(105) * q) / n(180),
                n(120) / n(180),
                (n(-200) + n(280) * q) / n(180),
                (n(126) - n(189) * q) / n(180),
                (n(-686) - n(126) * q) / n(180),
                (n(490) - n(70) * q) / n(180),
            ],
        ];

        let b = vec![r(1, 20), zero, r(16, 45), zero, r(49, 180), r(49, 180), r(1, 20)];

        // Quintic extension; stages 4 and 5 are conjugate in √21
        let dense = vec![
            vec![one, r(-27, 5), n(12), r(-47, 4), r(21, 5)],
            vec![zero],
            vec![zero, r(-104, 15), r(320, 9), r(-152, 3), r(112, 5)],
            vec![zero, r(162, 25), r(-162, 5), r(243, 5), r(-567, 25)],
            vec![
                zero,
                r(833, 300) + r(343, 300) * q,
                r(-637, 90) - r(119, 30) * q,
                r(98, 15) + r(287, 60) * q,
                r(-49, 25) - r(49, 25) * q,
            ],
            vec![
                zero,
                r(833, 300) - r(343, 300) * q,
                r(-637, 90) + r(119, 30) * q,
                r(98, 15) - r(287, 60) * q,
                r(-49, 25) + r(49, 25) * q,
            ],
            vec![zero, r(3, 10), -one, r(3, 4)],
        ];

        ButcherTableau::from_parts("Luther", 6, c, a, b, None, dense)
    }
}
