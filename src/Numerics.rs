//! # Numerics
//! Constrained minimization used by the equilibrium solver: smooth objective,
//! equality and lower-bound constraints, sequential quadratic programming.
/// constraint variants consumed by the minimizer
pub mod constraints;
/// dense convex QP subproblem
pub mod QP_solver;
/// sequential quadratic programming driver
pub mod SQP;
