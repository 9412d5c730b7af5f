use alloc::vec;

use super::tableau::{ButcherTableau, RungeKuttaMethod};
use crate::traits::RealScalar;

/// Gill's fourth-order method.
///
/// A variant of the classical scheme whose middle weights involve `√2`,
/// chosen originally to reduce round-off storage:
///
/// ```text
///   0 |
/// 1/2 |   1/2
/// 1/2 | (√2−1)/2   (2−√2)/2
///   1 |     0        −√2/2     (2+√2)/2
/// ----+--------------------------------------------
///     |    1/6     (2−√2)/6    (2+√2)/6     1/6
/// ```
///
/// The irrational entries are computed with the scalar's own square root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gill;

impl RungeKuttaMethod for Gill {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        let r = |p, q| T::ratio(p, q);
        let zero = T::zero();
        let one = T::one();
        let two = T::from_i64(2);
        let sqrt2 = two.sqrt();

        // Dense weights scale the classical middle stages by 1 ∓ 1/√2
        let lo = one - one / sqrt2;
        let hi = one + one / sqrt2;

        ButcherTableau::from_parts(
            "Gill",
            4,
            vec![r(1, 2), r(1, 2), one],
            vec![
                vec![r(1, 2)],
                vec![(sqrt2 - one) / two, (two - sqrt2) / two],
                vec![zero, -sqrt2 / two, (two + sqrt2) / two],
            ],
            vec![
                r(1, 6),
                (two - sqrt2) / T::from_i64(6),
                (two + sqrt2) / T::from_i64(6),
                r(1, 6),
            ],
            None,
            vec![
                vec![one, r(-3, 2), r(2, 3)],
                vec![zero, lo, lo * r(-2, 3)],
                vec![zero, hi, hi * r(-2, 3)],
                vec![zero, r(-1, 2), r(2, 3)],
            ],
        )
    }
}
