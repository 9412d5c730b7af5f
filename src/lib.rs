//! # kutta
//!
//! Explicit Runge-Kutta integration of ordinary differential equations
//! `y' = f(t, y)`, generic over the scalar type, no-std compatible (needs
//! `alloc`).
//!
//! ## Quick start
//!
//! ```
//! use kutta::ode::{ClassicalRungeKutta, FnSystem, RungeKuttaIntegrator};
//!
//! // y' = -y, y(0) = 1
//! let ode = FnSystem::new(1, |_t: f64, y: &[f64], y_dot: &mut [f64]| y_dot[0] = -y[0]);
//! let rk4 = RungeKuttaIntegrator::new(ClassicalRungeKutta, 0.1).unwrap();
//! let sol = rk4.integrate(&ode, 0.0, &[1.0], 1.0).unwrap();
//! assert!((sol.y[0] - (-1.0_f64).exp()).abs() < 1e-5);
//! ```
//!
//! ## Modules
//!
//! - [`ode`]: Butcher tableaux, a fixed-step driver, an adaptive driver for
//!   embedded pairs (Dormand-Prince 5(4), Higham-Hall 5(4)), dense output
//!   and step handlers.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: field operations (`+ - × ÷`, negation, zero, one)
//!   - [`RealScalar`]: ordered reals with `abs`, `sqrt`, `powf` and exact
//!     rational construction, used by every integrator
//!
//! - [`ddouble`]: [`DoubleDouble`], a ~32 digit real built from two `f64`s.
//!
//! ## Cargo features
//!
//! | Feature   | Default  | Description |
//! |-----------|----------|-------------|
//! | `std`     | yes      | Hardware FPU via system libm, `std::error::Error` |
//! | `libm`    | no       | Pure-Rust software float fallback for no-std |
//!
//! ## Logging
//!
//! Integration start, the initial step, rejected steps and extrapolated
//! interpolation are reported through [`tracing`] at `debug` level; accepted
//! steps at `trace`. No subscriber is installed by the library.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ddouble;
pub mod ode;
pub mod traits;

pub use ddouble::DoubleDouble;
pub use traits::{RealScalar, Scalar};
