use alloc::vec;

use super::tableau::{ButcherTableau, RungeKuttaMethod};
use crate::traits::RealScalar;

/// Kutta's 3/8 rule, order 4.
///
/// ```text
///   0 |
/// 1/3 |  1/3
/// 2/3 | −1/3   1
///   1 |   1   −1    1
/// ----+---------------------
///     |  1/8  3/8  3/8  1/8
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreeEighths;

impl RungeKuttaMethod for ThreeEighths {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        let r = |p, q| T::ratio(p, q);
        let zero = T::zero();
        let one = T::one();
        ButcherTableau::from_parts(
            "3/8",
            4,
            vec![r(1, 3), r(2, 3), one],
            vec![vec![r(1, 3)], vec![r(-1, 3), one], vec![one, -one, one]],
            vec![r(1, 8), r(3, 8), r(3, 8), r(1, 8)],
            None,
            vec![
                vec![one, r(-15, 8), one],
                vec![zero, r(15, 8), r(-3, 2)],
                vec![zero, r(3, 8)],
                vec![zero, r(-3, 8), r(1, 2)],
            ],
        )
    }
}
