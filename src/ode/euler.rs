use alloc::vec;

use super::tableau::{ButcherTableau, RungeKuttaMethod};
use crate::traits::RealScalar;

/// Forward Euler, order 1.
///
/// ```text
///  0 |
/// ---+---
///    | 1
/// ```
///
/// Its dense output is the straight line between the step boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euler;

impl RungeKuttaMethod for Euler {
    fn tableau<T: RealScalar>() -> ButcherTableau<T> {
        ButcherTableau::from_parts(
            "Euler",
            1,
            vec![],
            vec![],
            vec![T::one()],
            None,
            vec![vec![T::one()]],
        )
    }
}
