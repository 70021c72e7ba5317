//! Parsing of the distance and duration tokens members type.
//!
//! Distance: kilometers, `.` or `,` as the decimal separator (`5.6`, `5,6`).
//! Duration: `M:SS` (`27:30`), whole minutes (`30`) or decimal minutes
//! (`22.4`, truncated to whole seconds).

use crate::error::{AppError, Result};

/// Parse a distance token into kilometers. Must be positive and finite.
pub fn parse_distance_km(token: &str) -> Result<f64> {
    let normalized = token.trim().replace(',', ".");
    let km: f64 = normalized
        .parse()
        .map_err(|_| AppError::Validation(format!("unparsable distance {:?}", token)))?;

    if !km.is_finite() || km <= 0.0 {
        return Err(AppError::Validation(format!(
            "distance must be positive, got {:?}",
            token
        )));
    }
    Ok(km)
}

/// Parse a duration token into whole seconds. Must be positive.
pub fn parse_duration_secs(token: &str) -> Result<i64> {
    let normalized = token.trim().replace(',', ".");
    let unparsable = || AppError::Validation(format!("unparsable duration {:?}", token));

    let secs = if let Some((minutes, seconds)) = normalized.split_once(':') {
        let minutes: i64 = minutes.parse().map_err(|_| unparsable())?;
        let seconds: i64 = seconds.parse().map_err(|_| unparsable())?;
        if minutes < 0 || !(0..60).contains(&seconds) {
            return Err(unparsable());
        }
        minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(unparsable)?
    } else {
        let minutes: f64 = normalized.parse().map_err(|_| unparsable())?;
        if !minutes.is_finite() {
            return Err(unparsable());
        }
        // Truncation toward zero, so 22.4 min is 1344 s
        (minutes * 60.0) as i64
    };

    if secs <= 0 {
        return Err(AppError::Validation(format!(
            "duration must be positive, got {:?}",
            token
        )));
    }
    Ok(secs)
}
