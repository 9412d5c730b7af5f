use alloc::vec;
use alloc::vec::Vec;

use super::system::OdeStateAndDerivative;
use super::OdeError;
use crate::traits::RealScalar;

/// Absolute and relative error tolerances.
#[derive(Debug, Clone, PartialEq)]
pub enum Tolerance<T> {
    /// Same tolerances for every component.
    Scalar { absolute: T, relative: T },
    /// One pair per component of the main set.
    Vector { absolute: Vec<T>, relative: Vec<T> },
}

/// Step-size control settings for embedded methods.
///
/// Step bounds are stored as magnitudes; the sign follows the direction of
/// integration. Defaults for the controller factors:
///
/// | Factor          | Default |
/// |-----------------|---------|
/// | `safety`        | 0.9     |
/// | `min_reduction` | 0.2     |
/// | `max_growth`    | 10.0    |
///
/// Changing the tolerances forgets any initial step set with
/// [`set_initial_step_size`](Self::set_initial_step_size).
#[derive(Debug, Clone, PartialEq)]
pub struct StepsizeControl<T> {
    min_step: T,
    max_step: T,
    tolerance: Tolerance<T>,
    initial_step: Option<T>,
    safety: T,
    min_reduction: T,
    max_growth: T,
}

fn step_bounds<T: RealScalar>(min_step: T, max_step: T) -> Result<(T, T), OdeError> {
    let (min_step, max_step) = (min_step.abs(), max_step.abs());
    if !min_step.is_finite() || max_step < min_step || max_step == T::zero() {
        return Err(OdeError::InvalidStepBounds);
    }
    Ok((min_step, max_step))
}

fn vector_tolerance<T>(absolute: Vec<T>, relative: Vec<T>) -> Result<Tolerance<T>, OdeError> {
    if absolute.len() != relative.len() {
        return Err(OdeError::DimensionMismatch {
            expected: absolute.len(),
            found: relative.len(),
        });
    }
    Ok(Tolerance::Vector { absolute, relative })
}

impl<T: RealScalar> StepsizeControl<T> {
    /// Scalar tolerances.
    ///
    /// ```
    /// use kutta::ode::StepsizeControl;
    ///
    /// let control = StepsizeControl::new(1e-8, 1.0, 1e-10, 1e-10).unwrap();
    /// assert_eq!(control.safety(), 0.9);
    /// assert!(StepsizeControl::new(1.0, 0.5, 1e-10, 1e-10).is_err());
    /// ```
    pub fn new(min_step: T, max_step: T, absolute: T, relative: T) -> Result<Self, OdeError> {
        let (min_step, max_step) = step_bounds(min_step, max_step)?;
        Ok(Self {
            min_step,
            max_step,
            tolerance: Tolerance::Scalar { absolute, relative },
            initial_step: None,
            safety: T::ratio(9, 10),
            min_reduction: T::ratio(1, 5),
            max_growth: T::from_i64(10),
        })
    }

    /// Per-component tolerances; both vectors must have the same length.
    pub fn with_vector_tolerances(
        min_step: T,
        max_step: T,
        absolute: Vec<T>,
        relative: Vec<T>,
    ) -> Result<Self, OdeError> {
        let mut control = Self::new(min_step, max_step, T::zero(), T::zero())?;
        control.tolerance = vector_tolerance(absolute, relative)?;
        Ok(control)
    }

    /// Replace bounds and scalar tolerances.
    pub fn set_step_size_control(
        &mut self,
        min_step: T,
        max_step: T,
        absolute: T,
        relative: T,
    ) -> Result<(), OdeError> {
        let (min_step, max_step) = step_bounds(min_step, max_step)?;
        self.min_step = min_step;
        self.max_step = max_step;
        self.tolerance = Tolerance::Scalar { absolute, relative };
        self.initial_step = None;
        Ok(())
    }

    /// Replace bounds and per-component tolerances.
    pub fn set_vector_step_size_control(
        &mut self,
        min_step: T,
        max_step: T,
        absolute: Vec<T>,
        relative: Vec<T>,
    ) -> Result<(), OdeError> {
        let (min_step, max_step) = step_bounds(min_step, max_step)?;
        self.tolerance = vector_tolerance(absolute, relative)?;
        self.min_step = min_step;
        self.max_step = max_step;
        self.initial_step = None;
        Ok(())
    }

    /// Use `step` (magnitude) as the first step instead of the heuristic.
    ///
    /// Values outside `[min_step, max_step]` clear the override.
    pub fn set_initial_step_size(&mut self, step: T) {
        let step = step.abs();
        self.initial_step = if step < self.min_step || step > self.max_step {
            None
        } else {
            Some(step)
        };
    }

    #[inline]
    pub fn initial_step_size(&self) -> Option<T> {
        self.initial_step
    }

    #[inline]
    pub fn min_step(&self) -> T {
        self.min_step
    }

    #[inline]
    pub fn max_step(&self) -> T {
        self.max_step
    }

    #[inline]
    pub fn tolerance(&self) -> &Tolerance<T> {
        &self.tolerance
    }

    #[inline]
    pub fn safety(&self) -> T {
        self.safety
    }

    pub fn set_safety(&mut self, safety: T) {
        self.safety = safety;
    }

    #[inline]
    pub fn min_reduction(&self) -> T {
        self.min_reduction
    }

    pub fn set_min_reduction(&mut self, min_reduction: T) {
        self.min_reduction = min_reduction;
    }

    #[inline]
    pub fn max_growth(&self) -> T {
        self.max_growth
    }

    pub fn set_max_growth(&mut self, max_growth: T) {
        self.max_growth = max_growth;
    }

    /// Check vector tolerances against the main-set dimension.
    pub fn sanity_checks(&self, main_dimension: usize) -> Result<(), OdeError> {
        if let Tolerance::Vector { absolute, .. } = &self.tolerance {
            if absolute.len() != main_dimension {
                return Err(OdeError::DimensionMismatch {
                    expected: main_dimension,
                    found: absolute.len(),
                });
            }
        }
        Ok(())
    }

    /// `(absolute, relative)` tolerance of component `i`.
    #[inline]
    pub fn tolerance_at(&self, i: usize) -> (T, T) {
        match &self.tolerance {
            Tolerance::Scalar { absolute, relative } => (*absolute, *relative),
            Tolerance::Vector { absolute, relative } => (absolute[i], relative[i]),
        }
    }

    /// `abs_i + rel_i |y_i|` over the first `main_dimension` components.
    pub fn scale(&self, y: &[T], main_dimension: usize) -> Vec<T> {
        y[..main_dimension]
            .iter()
            .enumerate()
            .map(|(i, &yi)| {
                let (abs, rel) = self.tolerance_at(i);
                abs + rel * yi.abs()
            })
            .collect()
    }

    /// Signed first step.
    ///
    /// Returns the user override when set. Otherwise estimates the first
    /// and second derivative of the solution on the tolerance `scale` (one
    /// extra, counted, evaluation of `f` after a trial Euler step) and picks
    /// the step that brings the local truncation term down to `0.01`.
    ///
    /// Hairer, Nørsett & Wanner, *Solving Ordinary Differential Equations I*,
    /// §II.4.
    pub fn initialize_step<E>(
        &self,
        forward: bool,
        order: usize,
        scale: &[T],
        state0: &OdeStateAndDerivative<T>,
        mut eval: E,
    ) -> Result<T, OdeError>
    where
        E: FnMut(T, &[T], &mut [T]) -> Result<(), OdeError>,
    {
        let signed = |h: T| if forward { h } else { -h };

        if let Some(h) = self.initial_step {
            return Ok(signed(h));
        }

        let t0 = state0.time();
        let y0 = state0.state();
        let y_dot0 = state0.derivative();

        let mut y_on_scale2 = T::zero();
        let mut y_dot_on_scale2 = T::zero();
        for (j, &s) in scale.iter().enumerate() {
            let ratio = y0[j] / s;
            y_on_scale2 = y_on_scale2 + ratio * ratio;
            let ratio = y_dot0[j] / s;
            y_dot_on_scale2 = y_dot_on_scale2 + ratio * ratio;
        }

        let negligible = T::from_f64(1.0e-10);
        let h = if y_on_scale2 < negligible || y_dot_on_scale2 < negligible {
            T::from_f64(1.0e-6)
        } else {
            T::ratio(1, 100) * (y_on_scale2 / y_dot_on_scale2).sqrt()
        };
        let h = signed(h);

        // Trial Euler step over the whole state
        let y1: Vec<T> = y0.iter().zip(y_dot0).map(|(&y, &yd)| y + h * yd).collect();
        let mut y_dot1 = vec![T::zero(); y0.len()];
        eval(t0 + h, &y1, &mut y_dot1)?;

        let mut y_ddot_on_scale = T::zero();
        for (j, &s) in scale.iter().enumerate() {
            let ratio = (y_dot1[j] - y_dot0[j]) / s;
            y_ddot_on_scale = y_ddot_on_scale + ratio * ratio;
        }
        let y_ddot_on_scale = y_ddot_on_scale.sqrt() / h.abs();

        let max_inv2 = y_dot_on_scale2.sqrt().max_of(y_ddot_on_scale);
        let h1 = if max_inv2 < T::from_f64(1.0e-15) {
            T::from_f64(1.0e-6).max_of(T::ratio(1, 1000) * h.abs())
        } else {
            let exponent = T::one() / T::from_i64(order as i64);
            (T::ratio(1, 100) / max_inv2).powf(exponent)
        };

        let h = (T::from_i64(100) * h.abs()).min_of(h1);
        // Avoid cancellation when t0 is large
        let h = h.max_of(T::from_f64(1.0e-12) * t0.abs());
        let h = self.min_step.max_of(self.max_step.min_of(h));

        Ok(signed(h))
    }

    /// Bound a proposed step to `[min_step, max_step]` in magnitude.
    ///
    /// Below `min_step` the step is raised to `min_step` when
    /// `accept_small`, otherwise the run cannot continue.
    pub fn filter_step(&self, h: T, forward: bool, accept_small: bool) -> Result<T, OdeError> {
        let mut filtered = h;
        if h.abs() < self.min_step {
            if accept_small {
                filtered = if forward { self.min_step } else { -self.min_step };
            } else {
                return Err(OdeError::MinStepReached {
                    step: h.abs().to_f64(),
                    min_step: self.min_step.to_f64(),
                });
            }
        }

        if filtered > self.max_step {
            filtered = self.max_step;
        } else if filtered < -self.max_step {
            filtered = -self.max_step;
        }
        Ok(filtered)
    }

    /// `clamp(safety · error^(-1/order), min_reduction, max_growth)`.
    pub fn step_factor(&self, error: T, order: usize) -> T {
        if error <= T::zero() {
            return self.max_growth;
        }
        let exponent = -T::one() / T::from_i64(order as i64);
        let factor = self.safety * error.powf(exponent);
        self.max_growth.min_of(self.min_reduction.max_of(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> StepsizeControl<f64> {
        StepsizeControl::new(1e-6, 0.5, 1e-8, 1e-8).unwrap()
    }

    #[test]
    fn bounds_are_magnitudes() {
        let c = StepsizeControl::new(-1e-6, -0.5, 1e-8, 1e-8).unwrap();
        assert_eq!(c.min_step(), 1e-6);
        assert_eq!(c.max_step(), 0.5);
        assert_eq!(
            StepsizeControl::new(1.0, 0.5, 1e-8, 1e-8).unwrap_err(),
            OdeError::InvalidStepBounds
        );
        assert_eq!(
            StepsizeControl::new(0.0, 0.0, 1e-8, 1e-8).unwrap_err(),
            OdeError::InvalidStepBounds
        );
    }

    #[test]
    fn vector_tolerances_must_pair() {
        let err = StepsizeControl::with_vector_tolerances(0.0, 1.0, vec![1e-8; 3], vec![1e-8; 2]);
        assert_eq!(err.unwrap_err(), OdeError::DimensionMismatch { expected: 3, found: 2 });

        let c = StepsizeControl::with_vector_tolerances(0.0, 1.0, vec![1e-8, 1e-6], vec![0.0, 1e-3]).unwrap();
        assert_eq!(c.tolerance_at(1), (1e-6, 1e-3));
        assert!(c.sanity_checks(2).is_ok());
        assert_eq!(
            c.sanity_checks(3).unwrap_err(),
            OdeError::DimensionMismatch { expected: 3, found: 2 }
        );
    }

    #[test]
    fn initial_step_override_and_reset() {
        let mut c = control();
        c.set_initial_step_size(0.1);
        assert_eq!(c.initial_step_size(), Some(0.1));
        // Out of range clears it
        c.set_initial_step_size(2.0);
        assert_eq!(c.initial_step_size(), None);

        c.set_initial_step_size(0.1);
        c.set_step_size_control(1e-6, 0.5, 1e-6, 1e-6).unwrap();
        assert_eq!(c.initial_step_size(), None);

        c.set_initial_step_size(0.1);
        c.set_vector_step_size_control(1e-6, 0.5, vec![1e-6], vec![1e-6]).unwrap();
        assert_eq!(c.initial_step_size(), None);
    }

    #[test]
    fn override_is_signed_and_free() {
        let mut c = control();
        c.set_initial_step_size(0.125);
        let s0 = OdeStateAndDerivative::new(0.0, vec![1.0], vec![-1.0]);
        let mut calls = 0;
        let h = c
            .initialize_step(false, 5, &[1.0], &s0, |_t, _y, _d| {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(h, -0.125);
        assert_eq!(calls, 0);
    }

    #[test]
    fn heuristic_on_exponential_decay() {
        // y' = -y, y0 = 1, scale = 1e-8 + 1e-8·1
        let c = control();
        let scale = c.scale(&[1.0], 1);
        let s0 = OdeStateAndDerivative::new(0.0, vec![1.0], vec![-1.0]);
        let mut calls = 0;
        let h = c
            .initialize_step(true, 5, &scale, &s0, |_t, y, d| {
                calls += 1;
                d[0] = -y[0];
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 1);

        // First guess 0.01; ‖y'‖ dominates: h1 = (0.01 · 2e-8)^(1/5)
        let h1 = (0.01_f64 * 2e-8).powf(0.2);
        assert!((h - h1).abs() < 1e-12, "h = {h}, expected {h1}");
        assert!(h > 0.0 && h <= 0.5);
    }

    #[test]
    fn heuristic_with_zero_state() {
        // Both scaled norms vanish: trial step 1e-6, no curvature, fallback floor
        let c = control();
        let scale = c.scale(&[0.0], 1);
        let s0 = OdeStateAndDerivative::new(0.0, vec![0.0], vec![0.0]);
        let h = c
            .initialize_step(true, 4, &scale, &s0, |_t, _y, d| {
                d[0] = 0.0;
                Ok(())
            })
            .unwrap();
        // min(100 · 1e-6, max(1e-6, 1e-9)) = 1e-6
        assert_eq!(h, 1e-6);
    }

    #[test]
    fn filter_step_clamps() {
        let c = control();
        assert_eq!(c.filter_step(1.0, true, false).unwrap(), 0.5);
        assert_eq!(c.filter_step(-1.0, false, false).unwrap(), -0.5);
        assert_eq!(c.filter_step(1e-8, true, true).unwrap(), 1e-6);
        assert_eq!(c.filter_step(-1e-8, false, true).unwrap(), -1e-6);
        assert_eq!(
            c.filter_step(-1e-8, false, false).unwrap_err(),
            OdeError::MinStepReached { step: 1e-8, min_step: 1e-6 }
        );
        assert_eq!(c.filter_step(0.25, true, false).unwrap(), 0.25);
    }

    #[test]
    fn factor_is_clamped() {
        let c = control();
        assert_eq!(c.step_factor(0.0, 5), 10.0);
        assert_eq!(c.step_factor(1e-30, 5), 10.0);
        assert_eq!(c.step_factor(1e30, 5), 0.2);
        let f = c.step_factor(2.0, 5);
        assert!((f - 0.9 * 2.0_f64.powf(-0.2)).abs() < 1e-15);
    }
}
