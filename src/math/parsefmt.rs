use thiserror::Error;

use super::NEAR_ZERO;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no value entered")]
    Empty,
    #[error("`{0}` is not a number")]
    Malformed(String),
    #[error("value must be finite")]
    NotFinite,
    #[error("value must not be zero")]
    Zero,
}

/// Whether a coefficient within [`NEAR_ZERO`] of zero is refused while it is
/// being read, or left for the denominator checks of `evaluate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoefficientPolicy {
    Eager,
    Deferred,
}

impl CoefficientPolicy {
    pub fn from_reject_zero(reject_zero: bool) -> Self {
        if reject_zero {
            CoefficientPolicy::Eager
        } else {
            CoefficientPolicy::Deferred
        }
    }
}

/// Parses a finite real number. Either `.` or `,` can be the decimal
/// separator, but not both and not more than once.
pub fn parse_real(s: &str) -> Result<f64, InputError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(InputError::Empty);
    }
    let malformed = || InputError::Malformed(s.to_owned());

    let normalized = match s.matches(',').count() {
        0 => s.to_owned(),
        1 if !s.contains('.') => s.replace(',', "."),
        _ => return Err(malformed()),
    };
    let value: f64 = normalized.parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(InputError::NotFinite);
    }
    Ok(value)
}

pub fn parse_coefficient(s: &str, policy: CoefficientPolicy) -> Result<f64, InputError> {
    let value = parse_real(s)?;
    match policy {
        CoefficientPolicy::Eager if value.abs() <= NEAR_ZERO => Err(InputError::Zero),
        _ => Ok(value),
    }
}

/// Most decimal places a result is printed with.
pub const MAX_DECIMAL_PLACES: u32 = 64;

/// Fixed decimal places when given (at most [`MAX_DECIMAL_PLACES`]),
/// otherwise the shortest representation that reads back as the same value.
pub fn fmt_value(value: f64, places: Option<u32>) -> String {
    match places {
        Some(places) => {
            let places = places.min(MAX_DECIMAL_PLACES) as usize;
            format!("{value:.places$}")
        },
        None => format!("{value}"),
    }
}

#[test]
fn parse_test() {
    assert_eq!(parse_real("3.14159"), Ok(3.14159));
    assert_eq!(parse_real("3,5"), Ok(3.5));
    assert_eq!(parse_real(" -2.25 \n"), Ok(-2.25));
    assert_eq!(parse_real("1e-3"), Ok(0.001));
    assert_eq!(parse_real("42"), Ok(42.0));
    assert_eq!(parse_real(",5"), Ok(0.5));
}

#[test]
fn parse_rejects_test() {
    assert_eq!(parse_real(""), Err(InputError::Empty));
    assert_eq!(parse_real("   "), Err(InputError::Empty));
    assert_eq!(parse_real("1,2,3"), Err(InputError::Malformed("1,2,3".to_owned())));
    assert_eq!(parse_real("1.000,5"), Err(InputError::Malformed("1.000,5".to_owned())));
    assert_eq!(parse_real("abc"), Err(InputError::Malformed("abc".to_owned())));
    assert_eq!(parse_real("1.2.3"), Err(InputError::Malformed("1.2.3".to_owned())));
    assert_eq!(parse_real("inf"), Err(InputError::NotFinite));
    assert_eq!(parse_real("NaN"), Err(InputError::NotFinite));
    assert_eq!(parse_real("1e400"), Err(InputError::NotFinite));
}

#[test]
fn coefficient_policy_test() {
    for zero in ["0", "0,0", "-0.0", "1e-13"] {
        assert_eq!(parse_coefficient(zero, CoefficientPolicy::Eager), Err(InputError::Zero));
        assert!(parse_coefficient(zero, CoefficientPolicy::Deferred).is_ok());
    }
    assert_eq!(parse_coefficient("2,5", CoefficientPolicy::Eager), Ok(2.5));
    assert_eq!(parse_coefficient("x", CoefficientPolicy::Deferred), Err(InputError::Malformed("x".to_owned())));
}

#[test]
fn fmt_test() {
    assert_eq!(fmt_value(0.125, None), "0.125");
    assert_eq!(fmt_value(2.0, None), "2");
    assert_eq!(fmt_value(0.7, Some(4)), "0.7000");
    assert_eq!(fmt_value(-1.0 / 3.0, Some(3)), "-0.333");
    assert_eq!(fmt_value(1000.0, Some(0)), "1000");
}

#[test]
fn fmt_caps_decimal_places_test() {
    let capped = fmt_value(0.7, Some(MAX_DECIMAL_PLACES));
    assert_eq!(fmt_value(0.7, Some(70_000)), capped);
    assert_eq!(fmt_value(0.7, Some(u32::MAX)), capped);
    assert_eq!(capped.len(), "0.".len() + MAX_DECIMAL_PLACES as usize);
}
