use alloc::vec;

use super::tableau::{ButcherTableau, RungeKuttaMethod};
use crate::traits::RealScalar;

/// Explicit midpoint rule, order 2.
///
/// ```text
///   0 |
/// 1/2 | 1/2
/// ----+---------
///     |  0    1
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Midpoint;

impl RungeKuttaMethod for Midpoint {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        let half = T::ratio(1, 2);
        ButcherTableau::from_parts(
            "midpoint",
            2,
            vec![half],
            vec![vec![half]],
            vec![T::zero(), T::one()],
            None,
            // P_0 = θ − θ², P_1 = θ²
            vec![vec![T::one(), -T::one()], vec![T::zero(), T::one()]],
        )
    }
}
