mod ratio;
pub(crate) mod sample;

pub use self::ratio::{Ratio, RatioError, RatioParseError};
