//! ODE integration with explicit Runge-Kutta methods.
//!
//! Every method is a Butcher tableau consumed by one of two shared drivers:
//!
//! - [`RungeKuttaIntegrator`] steps at a constant size, shortening only the
//!   last step so the run lands exactly on the final time.
//! - [`EmbeddedRungeKuttaIntegrator`] controls the local error of an
//!   embedded pair, rejecting and retrying steps as needed (see
//!   [`StepsizeControl`]).
//!
//! Each accepted step is published to a [`StepHandler`] as a
//! [`RungeKuttaInterpolator`], a polynomial continuous extension evaluated
//! from the stage derivatives alone. [`ContinuousOutput`] records a whole
//! run for dense queries.
//!
//! | Method                    | Stages | Order | FSAL | Driver   |
//! |---------------------------|--------|-------|------|----------|
//! | [`Euler`]                 |      1 | 1     | no   | fixed    |
//! | [`Midpoint`]              |      2 | 2     | no   | fixed    |
//! | [`ClassicalRungeKutta`]   |      4 | 4     | no   | fixed    |
//! | [`Gill`]                  |      4 | 4     | no   | fixed    |
//! | [`ThreeEighths`]          |      4 | 4     | no   | fixed    |
//! | [`Luther`]                |      7 | 6     | no   | fixed    |
//! | [`DormandPrince54`]       |      7 | 5(4)  | yes  | adaptive |
//! | [`HighamHall54`]          |      7 | 5(4)  | yes  | adaptive |
//!
//! The drivers are generic over [`RealScalar`](crate::RealScalar); tableau
//! coefficients are exact ratios evaluated in the integration type, so
//! [`DoubleDouble`](crate::DoubleDouble) runs get every digit.
//!
//! All run state (current step, evaluation count) lives inside the
//! `integrate` call. An integrator can be shared between threads.
//!
//! # Example
//!
//! ```
//! use kutta::ode::{DormandPrince54, EmbeddedRungeKuttaIntegrator, FnSystem};
//!
//! // Harmonic oscillator: y'' = -y  →  [y, y'] with dy/dt = [y', -y]
//! let ode = FnSystem::new(2, |_t: f64, y: &[f64], y_dot: &mut [f64]| {
//!     y_dot[0] = y[1];
//!     y_dot[1] = -y[0];
//! });
//! let integrator = EmbeddedRungeKuttaIntegrator::new(DormandPrince54, 1e-10, 1.0, 1e-10, 1e-10).unwrap();
//! let tau = 2.0 * std::f64::consts::PI;
//! let sol = integrator.integrate(&ode, 0.0, &[1.0, 0.0], tau).unwrap();
//! assert!((sol.y[0] - 1.0).abs() < 1e-7); // cos(2π) ≈ 1
//! assert!(sol.y[1].abs() < 1e-7);         // sin(2π) ≈ 0
//! ```

mod adaptive;
mod dense;
mod embedded;
mod fixed;
mod handler;
mod interpolator;
mod stages;
mod system;
mod tableau;

mod dopri54;
mod euler;
mod gill;
mod hh54;
mod luther;
mod midpoint;
mod rk4;
mod three_eighths;

use alloc::vec::Vec;
use core::fmt;


pub use adaptive::{StepsizeControl, Tolerance};
pub use dense::DenseOutput;
pub use embedded::EmbeddedRungeKuttaIntegrator;
pub use fixed::RungeKuttaIntegrator;
pub use handler::{ContinuousOutput, StepAction, StepHandler};
pub use interpolator::RungeKuttaInterpolator;
pub use system::{FnSystem, OdeStateAndDerivative, OdeSystem};
pub use tableau::{ButcherTableau, EmbeddedMethod, RungeKuttaMethod};

pub use dopri54::DormandPrince54;
pub use euler::Euler;
pub use gill::Gill;
pub use hh54::HighamHall54;
pub use luther::Luther;
pub use midpoint::Midpoint;
pub use rk4::ClassicalRungeKutta;
pub use three_eighths::ThreeEighths;

/// Errors from ODE integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OdeError {
    /// A vector does not match the dimension it must have (initial state
    /// vs. ODE, tolerance vectors vs. main set).
    DimensionMismatch { expected: usize, found: usize },
    /// Step bounds are negative, non-finite, or `max < min`.
    InvalidStepBounds,
    /// Fixed step size is zero or not finite.
    InvalidStepSize,
    /// Tableau arrays have inconsistent shapes.
    InvalidTableau,
    /// Start time, final time or initial state is NaN or infinite.
    NonFiniteInput,
    /// Start and final time coincide.
    IntervalTooSmall,
    /// A rejected step would have to shrink below the minimum step.
    MinStepReached { step: f64, min_step: f64 },
    /// The right-hand side evaluation budget is spent.
    MaxEvaluationsExceeded { max: usize },
    /// Step error or state became non-finite (NaN / Inf).
    StepNotFinite,
    /// Interpolation requested but no step recorded.
    NoDenseOutput,
    /// Interpolation point outside the recorded range.
    InterpOutOfBounds,
}

impl fmt::Display for OdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
            Self::InvalidStepBounds => write!(f, "invalid step bounds"),
            Self::InvalidStepSize => write!(f, "step size must be finite and non-zero"),
            Self::InvalidTableau => write!(f, "inconsistent Butcher tableau"),
            Self::NonFiniteInput => write!(f, "start time, final time and initial state must be finite"),
            Self::IntervalTooSmall => write!(f, "integration interval too small"),
            Self::MinStepReached { step, min_step } => write!(
                f,
                "minimal step size ({:e}) reached, integration needs {:e}",
                min_step, step
            ),
            Self::MaxEvaluationsExceeded { max } => {
                write!(f, "maximal count ({}) of evaluations exceeded", max)
            }
            Self::StepNotFinite => write!(f, "step error is not finite"),
            Self::NoDenseOutput => write!(f, "no dense output recorded"),
            Self::InterpOutOfBounds => write!(f, "interpolation point out of bounds"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OdeError {}

/// Result of an integration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<T> {
    /// Final independent variable value.
    pub t: T,
    /// Final state vector.
    pub y: Vec<T>,
    /// Derivative at the final state.
    pub y_dot: Vec<T>,
    /// Total derivative evaluations, including the initial one.
    pub evals: usize,
    /// Accepted steps.
    pub accepted: usize,
    /// Rejected steps (adaptive only).
    pub rejected: usize,
    /// Whether a step handler ended the run before the final time.
    pub stopped: bool,
}
