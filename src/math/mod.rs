pub mod model;
pub mod parsefmt;

/// Magnitude below which a denominator (or an eagerly checked coefficient)
/// counts as zero.
pub const NEAR_ZERO: f64 = 1e-12;
