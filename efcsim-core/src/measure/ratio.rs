use std::{fmt, str::FromStr};

/// A validated ratio in the range `[0.0, 1.0]`.
///
/// Used for the probabilities and size factors of the pipeline: the edge
/// filtering ratio (drop probability) and the fog aggregation ratio.
///
/// # Example
///
/// ```
/// use efcsim_core::Ratio;
///
/// let filtering = Ratio::new(0.05).unwrap();
/// assert_eq!(filtering.to_string(), "5%");
///
/// // both the percentage and the plain form parse
/// assert_eq!("5%".parse::<Ratio>().unwrap(), filtering);
/// assert_eq!("0.05".parse::<Ratio>().unwrap(), filtering);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Create a new validated ratio.
    ///
    /// # Errors
    ///
    /// Returns [`RatioError`] if `value` is NaN, negative, or greater
    /// than `1.0`.
    pub fn new(value: f64) -> Result<Self, RatioError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(RatioError(value));
        }
        Ok(Self(value))
    }

    /// `value` must be in `[0.0, 1.0]`.
    pub(crate) const fn new_unchecked(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Ratio {
    /// Formats as a percentage with up to 2 decimal places.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.0 * 100.0;
        if pct.fract() == 0.0 {
            write!(f, "{}%", pct as u64)
        } else {
            write!(f, "{pct:.2}%")
        }
    }
}

impl FromStr for Ratio {
    type Err = RatioParseError;

    /// Parses either a percentage (`"60%"`) or a plain ratio (`"0.6"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = match s.strip_suffix('%') {
            Some(pct) => {
                let pct: f64 = pct
                    .trim()
                    .parse()
                    .map_err(|_| RatioParseError::InvalidNumber(s.to_owned()))?;
                pct / 100.0
            }
            None => s
                .parse()
                .map_err(|_| RatioParseError::InvalidNumber(s.to_owned()))?,
        };
        Ok(Self::new(value)?)
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Error returned when constructing a [`Ratio`] with a value outside
/// `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("ratio must be in [0.0, 1.0], got {0}")]
pub struct RatioError(f64);

/// Error returned when parsing a [`Ratio`] from a string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatioParseError {
    #[error("invalid ratio `{0}'")]
    InvalidNumber(String),
    #[error("{0}")]
    OutOfRange(#[from] RatioError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accepted() {
        assert_eq!(Ratio::new(0.0).unwrap(), Ratio::ZERO);
        assert_eq!(Ratio::new(1.0).unwrap(), Ratio::ONE);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(Ratio::new(f64::NAN).is_err());
        assert!(Ratio::new(-0.1).is_err());
        assert!(Ratio::new(1.5).is_err());
    }

    #[test]
    fn error_display() {
        let err = Ratio::new(2.0).unwrap_err();
        assert_eq!(err.to_string(), "ratio must be in [0.0, 1.0], got 2");
    }

    #[test]
    fn display() {
        assert_eq!(Ratio::ZERO.to_string(), "0%");
        assert_eq!(Ratio::ONE.to_string(), "100%");
        assert_eq!(Ratio::new(0.5).unwrap().to_string(), "50%");
        assert_eq!(Ratio::new(0.123).unwrap().to_string(), "12.30%");
    }

    #[test]
    fn parse() {
        assert_eq!("50%".parse::<Ratio>().unwrap(), Ratio::new(0.5).unwrap());
        assert_eq!(" 0.25 ".parse::<Ratio>().unwrap(), Ratio::new(0.25).unwrap());
        assert_eq!("1".parse::<Ratio>().unwrap(), Ratio::ONE);
    }

    #[test]
    fn parse_invalid() {
        assert!(matches!(
            "abc".parse::<Ratio>(),
            Err(RatioParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            "150%".parse::<Ratio>(),
            Err(RatioParseError::OutOfRange(_))
        ));
        assert!(matches!(
            "-0.5".parse::<Ratio>(),
            Err(RatioParseError::OutOfRange(_))
        ));
    }
}
