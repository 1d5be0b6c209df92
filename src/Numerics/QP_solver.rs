//! Convex quadratic subproblem of one SQP iteration:
//! ```text
//! min  ½ dᵀB d + gᵀd
//! s.t. E d  = e
//!      C d >= c
//! ```
//! with B symmetric positive definite. The dual is maximized by Hildreth's coordinate
//! ascent, then the active set it identifies is polished by solving the KKT system of
//! that set directly.
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QPError {
    #[error("Hessian approximation is not positive definite")]
    NotPositiveDefinite,
    #[error("QP subproblem constraints are incompatible (residual {0:e})")]
    Infeasible(f64),
}

pub struct QPProblem<'a> {
    pub hessian: &'a DMatrix<f64>,
    pub gradient: &'a DVector<f64>,
    pub eq_matrix: DMatrix<f64>,
    pub eq_rhs: DVector<f64>,
    pub ineq_matrix: DMatrix<f64>,
    pub ineq_rhs: DVector<f64>,
}

#[derive(Debug, Clone)]
pub struct QPSolution {
    pub d: DVector<f64>,
    /// multipliers of the equality rows, then of the inequality rows
    pub multipliers: DVector<f64>,
    pub sweeps: usize,
    /// largest constraint residual of the subproblem at `d`
    pub residual: f64,
}

impl<'a> QPProblem<'a> {
    fn n_eq(&self) -> usize {
        self.eq_matrix.nrows()
    }

    fn stacked(&self) -> (DMatrix<f64>, DVector<f64>) {
        let n = self.gradient.len();
        let m_eq = self.n_eq();
        let m = m_eq + self.ineq_matrix.nrows();
        let mut a = DMatrix::zeros(m, n);
        let mut r = DVector::zeros(m);
        for i in 0..m_eq {
            a.set_row(i, &self.eq_matrix.row(i));
            r[i] = self.eq_rhs[i];
        }
        for i in 0..self.ineq_matrix.nrows() {
            a.set_row(m_eq + i, &self.ineq_matrix.row(i));
            r[m_eq + i] = self.ineq_rhs[i];
        }
        (a, r)
    }

    /// max |E d − e| and max (c − C d)+
    pub fn residual(&self, d: &DVector<f64>) -> f64 {
        let eq = (&self.eq_matrix * d - &self.eq_rhs).amax();
        let ineq = (&self.ineq_rhs - &self.ineq_matrix * d)
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(*v));
        if self.n_eq() == 0 {
            ineq
        } else {
            eq.max(ineq)
        }
    }

    pub fn solve(&self, max_sweeps: usize, tol: f64) -> Result<QPSolution, QPError> {
        let chol = self
            .hessian
            .clone()
            .cholesky()
            .ok_or(QPError::NotPositiveDefinite)?;
        let b_inv = chol.inverse();
        let (a, r) = self.stacked();
        let m = a.nrows();
        let m_eq = self.n_eq();
        if m == 0 {
            let d = -(&b_inv * self.gradient);
            return Ok(QPSolution {
                d,
                multipliers: DVector::zeros(0),
                sweeps: 0,
                residual: 0.0,
            });
        }
        let a_binv = &a * &b_inv;
        let h = &a_binv * a.transpose();
        let rhs = &r + &a_binv * self.gradient;

        let mut nu = DVector::<f64>::zeros(m);
        let mut sweeps = 0;
        while sweeps < max_sweeps {
            sweeps += 1;
            let mut max_change = 0.0_f64;
            for k in 0..m {
                let hkk = h[(k, k)];
                if hkk <= f64::EPSILON {
                    continue;
                }
                let hk_nu: f64 = (0..m).map(|j| h[(k, j)] * nu[j]).sum();
                let mut new = nu[k] + (rhs[k] - hk_nu) / hkk;
                if k >= m_eq {
                    new = new.max(0.0);
                }
                max_change = max_change.max((new - nu[k]).abs());
                nu[k] = new;
            }
            if max_change <= tol * (1.0 + nu.amax()) {
                break;
            }
        }
        let mut d = &b_inv * (a.transpose() * &nu - self.gradient);

        if let Some((d_polished, nu_polished)) = self.polish(&a, &r, &nu, tol) {
            d = d_polished;
            nu = nu_polished;
        }
        let residual = self.residual(&d);
        let scale = 1.0 + r.amax() + d.amax();
        if residual > 1e-6 * scale {
            return Err(QPError::Infeasible(residual));
        }
        Ok(QPSolution {
            d,
            multipliers: nu,
            sweeps,
            residual,
        })
    }

    /// Equality-constrained QP on the rows Hildreth left active:
    /// [B  −Aᵀ; A  0] [d; ν] = [−g; r]
    fn polish(
        &self,
        a: &DMatrix<f64>,
        r: &DVector<f64>,
        nu: &DVector<f64>,
        tol: f64,
    ) -> Option<(DVector<f64>, DVector<f64>)> {
        let n = self.gradient.len();
        let m_eq = self.n_eq();
        let active: Vec<usize> = (0..a.nrows())
            .filter(|&k| k < m_eq || nu[k] > 0.0)
            .collect();
        let p = active.len();
        let mut kkt = DMatrix::zeros(n + p, n + p);
        kkt.view_mut((0, 0), (n, n)).copy_from(self.hessian);
        let mut rhs = DVector::zeros(n + p);
        for i in 0..n {
            rhs[i] = -self.gradient[i];
        }
        for (row, &k) in active.iter().enumerate() {
            for j in 0..n {
                kkt[(n + row, j)] = a[(k, j)];
                kkt[(j, n + row)] = -a[(k, j)];
            }
            rhs[n + row] = r[k];
        }
        let solution = kkt.svd(true, true).solve(&rhs, 1e-12).ok()?;
        let d = solution.rows(0, n).into_owned();
        let mut full_nu = DVector::zeros(a.nrows());
        for (row, &k) in active.iter().enumerate() {
            full_nu[k] = solution[n + row];
        }
        let scale = 1.0 + r.amax() + d.amax();
        let multipliers_ok = (m_eq..a.nrows()).all(|k| full_nu[k] >= -tol.sqrt() * (1.0 + full_nu.amax()));
        if multipliers_ok && self.residual(&d) <= 1e-10 * scale && d.iter().all(|v| v.is_finite()) {
            for k in m_eq..a.nrows() {
                full_nu[k] = full_nu[k].max(0.0);
            }
            Some((d, full_nu))
        } else {
            None
        }
    }
}
