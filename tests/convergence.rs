//! Observed global order of every built-in method.
//!
//! Each method runs at a fixed step `h` and `h/2`; the error ratio must be
//! close to `2^order`.

use kutta::ode::{
    ClassicalRungeKutta, DormandPrince54, Euler, FnSystem, Gill, HighamHall54, Luther, Midpoint,
    RungeKuttaIntegrator, RungeKuttaMethod, ThreeEighths,
};

const T_END: f64 = 2.0;

fn observed_order<M: RungeKuttaMethod + Default>(h: f64) -> (usize, f64) {
    // y' = -2ty, y(0) = 1  →  y = exp(-t²)
    let ode = FnSystem::new(1, |t: f64, y: &[f64], y_dot: &mut [f64]| y_dot[0] = -2.0 * t * y[0]);
    let exact = (-T_END * T_END).exp();

    let error = |step: f64| {
        let integrator = RungeKuttaIntegrator::new(M::default(), step).unwrap();
        let sol = integrator.integrate(&ode, 0.0, &[1.0], T_END).unwrap();
        (sol.y[0] - exact).abs()
    };

    let order = M::tableau::<f64>().order();
    (order, (error(h) / error(h / 2.0)).log2())
}

fn check<M: RungeKuttaMethod + Default>() {
    let (order, observed) = observed_order::<M>(0.05);
    let name = M::tableau::<f64>().name();
    assert!(
        (observed - order as f64).abs() < 0.3,
        "{name}: observed order {observed:.3}, expected {order}"
    );
}

#[test]
fn euler_order() {
    check::<Euler>();
}

#[test]
fn midpoint_order() {
    check::<Midpoint>();
}

#[test]
fn classical_order() {
    check::<ClassicalRungeKutta>();
}

#[test]
fn gill_order() {
    check::<Gill>();
}

#[test]
fn three_eighths_order() {
    check::<ThreeEighths>();
}

#[test]
fn luther_order() {
    check::<Luther>();
}

#[test]
fn dormand_prince_order() {
    check::<DormandPrince54>();
}

#[test]
fn higham_hall_order() {
    check::<HighamHall54>();
}

#[test]
fn gill_matches_classical_in_exact_arithmetic() {
    // Same fourth-order solution up to round-off on a linear problem
    let ode = FnSystem::new(1, |_t: f64, y: &[f64], y_dot: &mut [f64]| y_dot[0] = -y[0]);
    let gill = RungeKuttaIntegrator::new(Gill, 0.1).unwrap();
    let rk4 = RungeKuttaIntegrator::new(ClassicalRungeKutta, 0.1).unwrap();
    let a = gill.integrate(&ode, 0.0, &[1.0], 1.0).unwrap();
    let b = rk4.integrate(&ode, 0.0, &[1.0], 1.0).unwrap();
    assert!((a.y[0] - b.y[0]).abs() < 1e-14);
}
