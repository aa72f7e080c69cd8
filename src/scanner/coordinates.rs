//! Conversion of GPS degree/minute/second rationals to decimal degrees.
//!
//! The hemisphere reference (N/S/E/W) is stored separately by the caller, so
//! the value returned here is never negated.

use exif::Rational;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("expected 3 rational components, found {0}")]
    ComponentCount(usize),

    #[error("zero denominator in component {index}")]
    ZeroDenominator { index: usize },

    #[error("value is not a rational")]
    NotRational,
}

/// Convert a `[degrees, minutes, seconds]` triple to decimal degrees.
pub fn to_decimal_degrees(dms: &[Rational]) -> Result<f64, CoordinateError> {
    if dms.len() != 3 {
        return Err(CoordinateError::ComponentCount(dms.len()));
    }

    let mut parts = [0.0f64; 3];
    for (index, r) in dms.iter().enumerate() {
        if r.denom == 0 {
            return Err(CoordinateError::ZeroDenominator { index });
        }
        parts[index] = r.num as f64 / r.denom as f64;
    }

    Ok(dms_to_decimal(parts[0], parts[1], parts[2]))
}

fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}
