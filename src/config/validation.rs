use crate::error::ValidationError;

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

impl Bound {
    fn admits_above(self, value: f64) -> bool {
        match self {
            Self::Inclusive(min) => value >= min,
            Self::Exclusive(min) => value > min,
        }
    }

    fn admits_below(self, value: f64) -> bool {
        match self {
            Self::Inclusive(max) => value <= max,
            Self::Exclusive(max) => value < max,
        }
    }
}

fn describe(min: Bound, max: Bound) -> String {
    let (open, low) = match min {
        Bound::Inclusive(v) => ('[', v),
        Bound::Exclusive(v) => ('(', v),
    };
    let (close, high) = match max {
        Bound::Inclusive(v) => (']', v),
        Bound::Exclusive(v) => (')', v),
    };
    format!("must be finite and within {open}{low}, {high}{close}")
}

pub(crate) fn require_real(
    field: &'static str,
    value: Option<f64>,
    min: Bound,
    max: Bound,
) -> Result<f64, ValidationError> {
    let value = value.ok_or_else(|| ValidationError::missing(field))?;
    if !value.is_finite() || !min.admits_above(value) || !max.admits_below(value) {
        return Err(ValidationError::out_of_range(
            field,
            format!("{} (got {value})", describe(min, max)),
        ));
    }
    Ok(value)
}

pub(crate) fn require_count(
    field: &'static str,
    value: Option<i64>,
    min: u32,
    max: u32,
) -> Result<u32, ValidationError> {
    let value = value.ok_or_else(|| ValidationError::missing(field))?;
    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| {
            ValidationError::out_of_range(
                field,
                format!("must be an integer within [{min}, {max}] (got {value})"),
            )
        })
}

pub(crate) fn optional_count(
    field: &'static str,
    value: Option<i64>,
    min: u32,
    max: u32,
) -> Result<Option<u32>, ValidationError> {
    value
        .map(|raw| require_count(field, Some(raw), min, max))
        .transpose()
}

/// Rule 1: both windows positive and strictly ordered.
pub(crate) fn validate_windows(short: i64, long: i64) -> Result<(u32, u32), ValidationError> {
    let ordering = || ValidationError::WindowOrdering { short, long };
    let short_window = u32::try_from(short).ok().filter(|v| *v >= 1);
    let long_window = u32::try_from(long).ok().filter(|v| *v >= 1);
    match (short_window, long_window) {
        (Some(s), Some(l)) if s < l => Ok((s, l)),
        _ => Err(ordering()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_bounds_distinguish_open_and_closed_ends() {
        assert!(require_real("x", Some(0.0), Bound::Inclusive(0.0), Bound::Inclusive(1.0)).is_ok());
        assert!(require_real("x", Some(0.0), Bound::Exclusive(0.0), Bound::Inclusive(1.0)).is_err());
        assert!(require_real("x", Some(f64::NAN), Bound::Inclusive(0.0), Bound::Inclusive(1.0)).is_err());
        assert_eq!(
            require_real("x", None, Bound::Inclusive(0.0), Bound::Inclusive(1.0)),
            Err(ValidationError::missing("x"))
        );
    }

    #[test]
    fn windows_reject_non_positive_and_unordered_values() {
        assert_eq!(validate_windows(5, 20), Ok((5, 20)));
        assert!(validate_windows(0, 20).is_err());
        assert!(validate_windows(20, 20).is_err());
        assert!(validate_windows(-3, 20).is_err());
    }
}
