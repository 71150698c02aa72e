use std::fmt;

use thiserror::Error;

use super::NEAR_ZERO;
use super::parsefmt::fmt_value;

/// The denominator checkpoint that came out within [`NEAR_ZERO`] of zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// `a*x` of a [`SimpleFraction`].
    Single,
    /// `a3*x`, checked first.
    Innermost,
    /// `a2*x + 1/(a3*x)`.
    Middle,
    /// `a1*x + 1/(...)`, checked last.
    Outer,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Single => "single-level denominator a*x",
            Stage::Innermost => "innermost denominator a3*x",
            Stage::Middle => "middle denominator a2*x + 1/(a3*x)",
            Stage::Outer => "outer denominator a1*x + 1/(...)",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{stage} is zero")]
pub struct DivisionByZero {
    pub stage: Stage,
}

/// Returned by `initialize` when the number of coefficients does not match
/// the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("expected {expected} coefficients, got {got}")]
pub struct ArityError {
    pub expected: usize,
    pub got: usize,
}

/// The capability shared by both models.
pub trait Fraction {
    /// Formula and current coefficients, for display only.
    fn describe(&self) -> String;

    /// Value of the fraction at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`DivisionByZero`] naming the first denominator whose
    /// magnitude is below [`NEAR_ZERO`].
    fn evaluate(&self, x: f64) -> Result<f64, DivisionByZero>;
}

fn reciprocal(denominator: f64, stage: Stage) -> Result<f64, DivisionByZero> {
    if denominator.abs() < NEAR_ZERO {
        return Err(DivisionByZero { stage });
    }
    Ok(1.0 / denominator)
}

fn check_arity(expected: usize, coefficients: &[f64]) -> Result<(), ArityError> {
    if coefficients.len() != expected {
        return Err(ArityError { expected, got: coefficients.len() });
    }
    Ok(())
}

/// `1/(a*x)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimpleFraction {
    a: f64,
}

impl Default for SimpleFraction {
    fn default() -> Self {
        Self { a: 1.0 }
    }
}

impl SimpleFraction {
    pub fn new(a: f64) -> Self {
        Self { a }
    }

    pub fn coefficients(&self) -> [f64; 1] {
        [self.a]
    }

    /// Overwrites `a`.
    pub fn initialize(&mut self, coefficients: &[f64]) -> Result<(), ArityError> {
        check_arity(1, coefficients)?;
        self.a = coefficients[0];
        Ok(())
    }
}

impl Fraction for SimpleFraction {
    fn describe(&self) -> String {
        format!("fraction: 1/(a*x), a = {}", fmt_value(self.a, None))
    }

    fn evaluate(&self, x: f64) -> Result<f64, DivisionByZero> {
        reciprocal(self.a * x, Stage::Single)
    }
}

impl fmt::Display for SimpleFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleFraction({})", fmt_value(self.a, None))
    }
}

/// `1/(a1*x + 1/(a2*x + 1/(a3*x)))`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContinuedFraction {
    a1: f64,
    a2: f64,
    a3: f64,
}

impl Default for ContinuedFraction {
    fn default() -> Self {
        Self { a1: 1.0, a2: 1.0, a3: 1.0 }
    }
}

impl ContinuedFraction {
    pub fn new(a1: f64, a2: f64, a3: f64) -> Self {
        Self { a1, a2, a3 }
    }

    pub fn coefficients(&self) -> [f64; 3] {
        [self.a1, self.a2, self.a3]
    }

    /// Overwrites `a1, a2, a3` in that order.
    pub fn initialize(&mut self, coefficients: &[f64]) -> Result<(), ArityError> {
        check_arity(3, coefficients)?;
        self.a1 = coefficients[0];
        self.a2 = coefficients[1];
        self.a3 = coefficients[2];
        Ok(())
    }
}

impl Fraction for ContinuedFraction {
    fn describe(&self) -> String {
        format!(
            "continued fraction: 1/(a1*x + 1/(a2*x + 1/(a3*x)))\na1 = {}, a2 = {}, a3 = {}",
            fmt_value(self.a1, None),
            fmt_value(self.a2, None),
            fmt_value(self.a3, None),
        )
    }

    // each denominator is checked before it divides the level above it
    fn evaluate(&self, x: f64) -> Result<f64, DivisionByZero> {
        let inner = reciprocal(self.a3 * x, Stage::Innermost)?;
        let middle = reciprocal(self.a2 * x + inner, Stage::Middle)?;
        reciprocal(self.a1 * x + middle, Stage::Outer)
    }
}

impl fmt::Display for ContinuedFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ContinuedFraction({}, {}, {})",
            fmt_value(self.a1, None),
            fmt_value(self.a2, None),
            fmt_value(self.a3, None),
        )
    }
}

/// Which model the user picked from the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Simple,
    Continued,
}

impl ModelKind {
    /// Names of the coefficients in the order `initialize` expects them.
    pub fn coefficient_names(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Simple => &["a"],
            ModelKind::Continued => &["a1", "a2", "a3"],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Model {
    Simple(SimpleFraction),
    Continued(ContinuedFraction),
}

impl Model {
    pub fn default_for(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Simple => Model::Simple(SimpleFraction::default()),
            ModelKind::Continued => Model::Continued(ContinuedFraction::default()),
        }
    }

    pub fn coefficients(&self) -> Vec<f64> {
        match self {
            Model::Simple(m) => m.coefficients().to_vec(),
            Model::Continued(m) => m.coefficients().to_vec(),
        }
    }

    pub fn initialize(&mut self, coefficients: &[f64]) -> Result<(), ArityError> {
        match self {
            Model::Simple(m) => m.initialize(coefficients),
            Model::Continued(m) => m.initialize(coefficients),
        }
    }
}

impl Fraction for Model {
    fn describe(&self) -> String {
        match self {
            Model::Simple(m) => m.describe(),
            Model::Continued(m) => m.describe(),
        }
    }

    fn evaluate(&self, x: f64) -> Result<f64, DivisionByZero> {
        match self {
            Model::Simple(m) => m.evaluate(x),
            Model::Continued(m) => m.evaluate(x),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Simple(m) => fmt::Display::fmt(m, f),
            Model::Continued(m) => fmt::Display::fmt(m, f),
        }
    }
}
