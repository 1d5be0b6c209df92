use enum_dispatch::enum_dispatch;
use nalgebra::DVector;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// c(x) = 0
    Equality,
    /// c(x) >= 0
    Inequality,
}

/// A constraint function c(x) with its gradient
#[enum_dispatch]
pub trait ConstraintFunction {
    fn value(&self, x: &DVector<f64>) -> f64;
    fn gradient(&self, x: &DVector<f64>) -> DVector<f64>;
    fn kind(&self) -> ConstraintKind;
    /// amount by which x violates the constraint, zero when satisfied
    fn violation(&self, x: &DVector<f64>) -> f64 {
        let v = self.value(x);
        match self.kind() {
            ConstraintKind::Equality => v.abs(),
            ConstraintKind::Inequality => (-v).max(0.0),
        }
    }
}

/// Σ_i coefficients_i·x_i − target = 0
#[derive(Debug, Clone, PartialEq)]
pub struct LinearEquality {
    /// what the row balances (an element name for mass balance)
    pub label: String,
    pub coefficients: Vec<f64>,
    pub target: f64,
}

/// x_index − floor >= 0
#[derive(Debug, Clone, PartialEq)]
pub struct LowerBound {
    pub index: usize,
    pub floor: f64,
}

impl ConstraintFunction for LinearEquality {
    fn value(&self, x: &DVector<f64>) -> f64 {
        self.coefficients
            .iter()
            .zip(x.iter())
            .map(|(a, xi)| a * xi)
            .sum::<f64>()
            - self.target
    }

    fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_fn(x.len(), |i, _| {
            self.coefficients.get(i).copied().unwrap_or(0.0)
        })
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Equality
    }
}

impl ConstraintFunction for LowerBound {
    fn value(&self, x: &DVector<f64>) -> f64 {
        x[self.index] - self.floor
    }

    fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut grad = DVector::zeros(x.len());
        grad[self.index] = 1.0;
        grad
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Inequality
    }
}

#[enum_dispatch(ConstraintFunction)]
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equality(LinearEquality),
    Inequality(LowerBound),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Equality(eq) => {
                let terms: Vec<String> = eq
                    .coefficients
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| **a != 0.0)
                    .map(|(i, a)| format!("{}*x{}", a, i))
                    .collect();
                write!(f, "[{}] {} = {}", eq.label, terms.join(" + "), eq.target)
            }
            Constraint::Inequality(lb) => write!(f, "x{} >= {}", lb.index, lb.floor),
        }
    }
}
