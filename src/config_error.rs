use crate::math::Float;

/// A configuration value that the controller cannot work with.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TkConfigError {
    #[error("`{field}` must be positive, but it is {value}")]
    NotPositive { field: &'static str, value: Float },
    #[error("`{field}` must not be negative, but it is {value}")]
    Negative { field: &'static str, value: Float },
    #[error("`{field}` must be above 0 and at most 1, but it is {value}")]
    NotAFraction { field: &'static str, value: Float },
    #[error("`max_slope_angle` must be between 0 and 90 degrees, but it is {0}")]
    SlopeAngleOutOfRange(Float),
    #[error("`min_hold_distance` ({min}) is greater than `max_hold_distance` ({max})")]
    InvertedHoldRange { min: Float, max: Float },
}

impl TkConfigError {
    pub(crate) fn check_positive(field: &'static str, value: Float) -> Result<(), Self> {
        // Written this way so that NaN fails too.
        if value > 0.0 {
            Ok(())
        } else {
            Err(Self::NotPositive { field, value })
        }
    }

    pub(crate) fn check_not_negative(field: &'static str, value: Float) -> Result<(), Self> {
        if value >= 0.0 {
            Ok(())
        } else {
            Err(Self::Negative { field, value })
        }
    }

    pub(crate) fn check_fraction(field: &'static str, value: Float) -> Result<(), Self> {
        if 0.0 < value && value <= 1.0 {
            Ok(())
        } else {
            Err(Self::NotAFraction { field, value })
        }
    }
}
