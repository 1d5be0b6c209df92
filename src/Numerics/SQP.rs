//! # SQP
//! Sequential quadratic programming for smooth objectives with equality and inequality
//! constraints:
//! 1) quadratic model of the Lagrangian with a Powell-damped BFGS Hessian;
//! 2) QP subproblem on the linearized constraints (see `QP_solver`);
//! 3) backtracking line search on the L1 exact-penalty merit function;
//! 4) after the loop, Gauss-Newton restoration of the equality constraints.
//!
//! The minimizer never panics on non-convergence: the last iterate is returned together
//! with a status and a message, the caller decides whether to accept it.
use super::QP_solver::{QPError, QPProblem};
use super::constraints::{ConstraintFunction, ConstraintKind};
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Objective function of the minimizer.
/// The default gradient is a central finite difference.
pub trait Objective {
    type Error;
    fn value(&mut self, x: &DVector<f64>) -> Result<f64, Self::Error>;
    fn gradient(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, Self::Error> {
        let mut grad = DVector::zeros(x.len());
        let mut shifted = x.clone();
        for i in 0..x.len() {
            let h = 1e-6 * (1.0 + x[i].abs());
            shifted[i] = x[i] + h;
            let f_plus = self.value(&shifted)?;
            shifted[i] = x[i] - h;
            let f_minus = self.value(&shifted)?;
            shifted[i] = x[i];
            grad[i] = (f_plus - f_minus) / (2.0 * h);
        }
        Ok(grad)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SQPOptions {
    pub max_iterations: usize,
    /// relative change of the objective (and step length) that counts as converged
    pub ftol: f64,
    /// absolute constraint violation accepted at the solution
    pub feasibility_tol: f64,
    pub max_qp_sweeps: usize,
}

impl Default for SQPOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            ftol: 1e-9,
            feasibility_tol: 1e-8,
            max_qp_sweeps: 20_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SQPStatus {
    Converged,
    IterationLimit,
    LineSearchFailed,
    ConstraintsNotSatisfied,
}

impl fmt::Display for SQPStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SQPStatus::Converged => "converged",
            SQPStatus::IterationLimit => "iteration limit reached",
            SQPStatus::LineSearchFailed => "line search failed",
            SQPStatus::ConstraintsNotSatisfied => "constraints not satisfied",
        };
        write!(f, "{}", s)
    }
}

/// report of one minimization
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub x: DVector<f64>,
    pub fun: f64,
    /// SQP iterations
    pub nit: usize,
    /// objective evaluations, gradients not included
    pub nfev: usize,
    pub success: bool,
    pub status: SQPStatus,
    pub message: String,
    pub max_violation: f64,
}

fn violations<C: ConstraintFunction>(constraints: &[C], x: &DVector<f64>) -> (f64, f64) {
    constraints.iter().fold((0.0, 0.0), |(sum, max), c| {
        let v = c.violation(x);
        (sum + v, f64::max(max, v))
    })
}

/// linearized constraints split by kind: (E, −c_eq, C, −c_in)
fn linearize<C: ConstraintFunction>(
    constraints: &[C],
    x: &DVector<f64>,
) -> (DMatrix<f64>, DVector<f64>, DMatrix<f64>, DVector<f64>) {
    let n = x.len();
    let eq: Vec<&C> = constraints
        .iter()
        .filter(|c| c.kind() == ConstraintKind::Equality)
        .collect();
    let ineq: Vec<&C> = constraints
        .iter()
        .filter(|c| c.kind() == ConstraintKind::Inequality)
        .collect();
    let mut e = DMatrix::zeros(eq.len(), n);
    let mut e_rhs = DVector::zeros(eq.len());
    for (i, c) in eq.iter().enumerate() {
        e.set_row(i, &c.gradient(x).transpose());
        e_rhs[i] = -c.value(x);
    }
    let mut ci = DMatrix::zeros(ineq.len(), n);
    let mut ci_rhs = DVector::zeros(ineq.len());
    for (i, c) in ineq.iter().enumerate() {
        ci.set_row(i, &c.gradient(x).transpose());
        ci_rhs[i] = -c.value(x);
    }
    (e, e_rhs, ci, ci_rhs)
}

/// Newton steps on the equality rows with the minimum-norm correction J⁺c
fn restore_equalities<C: ConstraintFunction>(constraints: &[C], x: &mut DVector<f64>) {
    let eq: Vec<&C> = constraints
        .iter()
        .filter(|c| c.kind() == ConstraintKind::Equality)
        .collect();
    if eq.is_empty() {
        return;
    }
    for _ in 0..10 {
        let residual = DVector::from_iterator(eq.len(), eq.iter().map(|c| c.value(x)));
        if residual.amax() <= 1e-14 * (1.0 + x.amax()) {
            break;
        }
        let mut jac = DMatrix::zeros(eq.len(), x.len());
        for (i, c) in eq.iter().enumerate() {
            jac.set_row(i, &c.gradient(x).transpose());
        }
        match jac.svd(true, true).pseudo_inverse(1e-12) {
            Ok(pinv) => *x -= pinv * residual,
            Err(e) => {
                warn!("equality restoration skipped: {}", e);
                break;
            }
        }
    }
}

/// Minimizes `objective` from `x0` subject to `constraints`.
/// Errors from the objective abort the minimization and are returned unchanged.
pub fn minimize<O, C>(
    objective: &mut O,
    x0: DVector<f64>,
    constraints: &[C],
    options: &SQPOptions,
) -> Result<OptimizeResult, O::Error>
where
    O: Objective,
    C: ConstraintFunction,
{
    let n = x0.len();
    let mut x = x0;
    let mut nfev = 1;
    let mut f = objective.value(&x)?;
    if !f.is_finite() {
        let (_, max_violation) = violations(constraints, &x);
        return Ok(OptimizeResult {
            x,
            fun: f,
            nit: 0,
            nfev,
            success: false,
            status: SQPStatus::LineSearchFailed,
            message: "objective is not finite at the initial point".to_string(),
            max_violation,
        });
    }
    let mut g = objective.gradient(&x)?;
    let scale = f64::max(1.0, g.amax()) / f64::max(1.0, x.amax());
    let mut b = DMatrix::<f64>::identity(n, n) * scale;
    let mut rho = 0.0_f64;
    let mut status = SQPStatus::IterationLimit;
    let mut message = format!(
        "Iteration limit reached ({} iterations)",
        options.max_iterations
    );
    let mut nit = 0;

    while nit < options.max_iterations {
        nit += 1;
        let (e, e_rhs, ci, ci_rhs) = linearize(constraints, &x);
        let qp = QPProblem {
            hessian: &b,
            gradient: &g,
            eq_matrix: e.clone(),
            eq_rhs: e_rhs,
            ineq_matrix: ci.clone(),
            ineq_rhs: ci_rhs,
        };
        let qp_solution = match qp.solve(options.max_qp_sweeps, 1e-14) {
            Ok(sol) => sol,
            Err(QPError::NotPositiveDefinite) => {
                // restart the quasi-Newton model
                b = DMatrix::identity(n, n) * scale;
                continue;
            }
            Err(err @ QPError::Infeasible(_)) => {
                status = SQPStatus::ConstraintsNotSatisfied;
                message = err.to_string();
                break;
            }
        };
        let d = qp_solution.d;
        let nu = qp_solution.multipliers;
        let (viol_l1, viol_max) = violations(constraints, &x);
        debug!(
            "SQP it {}: f = {:.10e}, |d| = {:.3e}, violation = {:.3e}, QP sweeps = {}",
            nit,
            f,
            d.amax(),
            viol_max,
            qp_solution.sweeps
        );
        if d.amax() <= options.ftol * (1.0 + x.amax()) && viol_max <= options.feasibility_tol {
            status = SQPStatus::Converged;
            message = "Optimization terminated successfully".to_string();
            break;
        }

        rho = rho.max(1.5 * nu.amax() + 1.0);
        let merit = |fv: f64, l1: f64| fv + rho * l1;
        let phi0 = merit(f, viol_l1);
        let slope = (g.dot(&d) - rho * viol_l1).min(-f64::EPSILON * (1.0 + phi0.abs()));

        let mut alpha = 1.0;
        let mut accepted = None;
        while alpha > 1e-10 {
            let x_new = &x + &d * alpha;
            let f_new = objective.value(&x_new)?;
            nfev += 1;
            if f_new.is_finite() {
                let (l1_new, _) = violations(constraints, &x_new);
                if merit(f_new, l1_new) <= phi0 + 1e-4 * alpha * slope {
                    accepted = Some((x_new, f_new));
                    break;
                }
            }
            alpha *= 0.5;
        }
        let Some((x_new, f_new)) = accepted else {
            status = SQPStatus::LineSearchFailed;
            message = format!("Line search failed at iteration {}", nit);
            break;
        };

        let g_new = objective.gradient(&x_new)?;
        // change of the Lagrangian gradient; constraint gradients taken at both points
        let (e_new, _, ci_new, _) = linearize(constraints, &x_new);
        let m_eq = e.nrows();
        let nu_eq = nu.rows(0, m_eq).into_owned();
        let nu_in = nu.rows(m_eq, nu.len() - m_eq).into_owned();
        let grad_l_old = &g - e.transpose() * &nu_eq - ci.transpose() * &nu_in;
        let grad_l_new = &g_new - e_new.transpose() * &nu_eq - ci_new.transpose() * &nu_in;
        let s = &x_new - &x;
        let mut y = grad_l_new - grad_l_old;
        let bs = &b * &s;
        let sbs = s.dot(&bs);
        if sbs > f64::EPSILON * (1.0 + s.norm_squared()) {
            let sy = s.dot(&y);
            if sy < 0.2 * sbs {
                let theta = 0.8 * sbs / (sbs - sy);
                y = &y * theta + &bs * (1.0 - theta);
            }
            let sy = s.dot(&y);
            if sy > 0.0 {
                b = &b - (&bs * bs.transpose()) / sbs + (&y * y.transpose()) / sy;
                b = (&b + b.transpose()) * 0.5;
            }
        }

        let f_change = (f_new - f).abs();
        let step = s.amax();
        x = x_new;
        f = f_new;
        g = g_new;
        let (_, viol_new) = violations(constraints, &x);
        if f_change <= options.ftol * (1.0 + f.abs())
            && step <= options.ftol.sqrt() * (1.0 + x.amax())
            && viol_new <= options.feasibility_tol
        {
            status = SQPStatus::Converged;
            message = "Optimization terminated successfully".to_string();
            break;
        }
    }

    restore_equalities(constraints, &mut x);
    f = objective.value(&x)?;
    nfev += 1;
    let (_, max_violation) = violations(constraints, &x);
    if status == SQPStatus::Converged && max_violation > options.feasibility_tol {
        status = SQPStatus::ConstraintsNotSatisfied;
        message = format!(
            "Positive constraint violation {:.3e} after convergence",
            max_violation
        );
    }
    let success = status == SQPStatus::Converged;
    if !success {
        warn!("SQP stopped: {} ({})", status, message);
    }
    Ok(OptimizeResult {
        x,
        fun: f,
        nit,
        nfev,
        success,
        status,
        message,
        max_violation,
    })
}
