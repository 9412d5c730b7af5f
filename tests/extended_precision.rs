//! The integrators running on `DoubleDouble` reach accuracies far beyond
//! what `f64` can represent.

use kutta::ode::{
    ContinuousOutput, DormandPrince54, EmbeddedRungeKuttaIntegrator, FnSystem, Luther,
    RungeKuttaIntegrator,
};
use kutta::{DoubleDouble, RealScalar};

type Dd = DoubleDouble;

/// `e^-1` from its alternating Taylor series, summed in double-double.
fn exp_minus_one() -> Dd {
    let mut term = Dd::from(1.0);
    let mut sum = term;
    for k in 1..40 {
        term = -term / Dd::from_i64(k);
        sum = sum + term;
    }
    sum
}

fn decay() -> FnSystem<Dd, impl Fn(Dd, &[Dd], &mut [Dd])> {
    FnSystem::new(1, |_t: Dd, y: &[Dd], y_dot: &mut [Dd]| y_dot[0] = -y[0])
}

#[test]
fn luther_sixth_order_below_f64_epsilon() {
    let exact = exp_minus_one();
    let error = |n: i64| {
        let integrator = RungeKuttaIntegrator::new(Luther, Dd::ratio(1, n)).unwrap();
        let sol = integrator.integrate(&decay(), Dd::from(0.0), &[Dd::from(1.0)], Dd::from(1.0)).unwrap();
        (sol.y[0] - exact).abs().to_f64()
    };

    let coarse = error(50);
    let fine = error(100);
    assert!(fine < 1e-15, "error at h = 1/100: {fine:e}");
    let observed = (coarse / fine).log2();
    assert!((observed - 6.0).abs() < 0.3, "observed order {observed}");
}

#[test]
fn dormand_prince_at_tight_tolerance() {
    let tol = Dd::from(1e-20);
    let integrator =
        EmbeddedRungeKuttaIntegrator::new(DormandPrince54, Dd::from(1e-12), Dd::from(1.0), tol, tol).unwrap();
    let mut output = ContinuousOutput::new();
    let sol = integrator
        .integrate_with(&decay(), Dd::from(0.0), &[Dd::from(1.0)], Dd::from(1.0), &mut output)
        .unwrap();

    let err = (sol.y[0] - exp_minus_one()).abs().to_f64();
    assert!(err < 1e-17, "error {err:e}");
    assert_eq!(sol.t, Dd::from(1.0));

    // Dense output keeps the extra digits at the step boundaries
    let last = output.interpolated_state(Dd::from(1.0)).unwrap();
    assert_eq!(last.state()[0], sol.y[0]);
}

#[test]
fn coefficients_carry_full_precision() {
    use kutta::ode::{Gill, RungeKuttaMethod};

    // Gill's weights involve √2; they must sum to one beyond f64 precision
    let tab = Gill::tableau::<Dd>();
    let sum = tab.b().iter().fold(Dd::from(0.0), |acc, &b| acc + b);
    assert!((sum - Dd::from(1.0)).abs().to_f64() < 1e-30);

    let tab = Luther::tableau::<Dd>();
    for (row, &c) in tab.a().iter().zip(tab.c()) {
        let s = row.iter().fold(Dd::from(0.0), |acc, &a| acc + a);
        assert!((s - c).abs().to_f64() < 1e-29);
    }
}
