#![forbid(unsafe_code)]

//! CSS lengths used by inline styles (`12px`, `1.5rem`, `1em`, `2vw`, `50%`, `0`).

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Rem(f32),
    Em(f32),
    Vw(f32),
    Vh(f32),
    Percent(f32),
}

impl Length {
    pub const ZERO: Self = Self::Px(0.0);

    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::Px(value)
    }

    /// The number without its unit.
    #[must_use]
    pub const fn value(self) -> f32 {
        match self {
            Self::Px(v)
            | Self::Rem(v)
            | Self::Em(v)
            | Self::Vw(v)
            | Self::Vh(v)
            | Self::Percent(v) => v,
        }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.value() == 0.0
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Rem(v) => write!(f, "{v}rem"),
            Self::Em(v) => write!(f, "{v}em"),
            Self::Vw(v) => write!(f, "{v}vw"),
            Self::Vh(v) => write!(f, "{v}vh"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Errors from [`Length::from_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthParseError {
    Empty,
    InvalidNumber(String),
    /// A non-zero number without a unit.
    MissingUnit(String),
    UnknownUnit(String),
}

impl fmt::Display for LengthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty length"),
            Self::InvalidNumber(s) => write!(f, "invalid length number: {s}"),
            Self::MissingUnit(s) => write!(f, "length is missing a unit: {s}"),
            Self::UnknownUnit(s) => write!(f, "unknown length unit: {s}"),
        }
    }
}

impl std::error::Error for LengthParseError {}

impl FromStr for Length {
    type Err = LengthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LengthParseError::Empty);
        }
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let value: f32 = number
            .parse()
            .map_err(|_| LengthParseError::InvalidNumber(s.to_string()))?;
        if !value.is_finite() {
            return Err(LengthParseError::InvalidNumber(s.to_string()));
        }
        match unit.trim().to_ascii_lowercase().as_str() {
            "" if value == 0.0 => Ok(Self::ZERO),
            "" => Err(LengthParseError::MissingUnit(s.to_string())),
            "px" => Ok(Self::Px(value)),
            "rem" => Ok(Self::Rem(value)),
            "em" => Ok(Self::Em(value)),
            "vw" => Ok(Self::Vw(value)),
            "vh" => Ok(Self::Vh(value)),
            "%" => Ok(Self::Percent(value)),
            _ => Err(LengthParseError::UnknownUnit(s.to_string())),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Length {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Length {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!("12px".parse(), Ok(Length::Px(12.0)));
        assert_eq!("1.5rem".parse(), Ok(Length::Rem(1.5)));
        assert_eq!(" 50% ".parse(), Ok(Length::Percent(50.0)));
        assert_eq!("0.5EM".parse(), Ok(Length::Em(0.5)));
        assert_eq!("2vw".parse(), Ok(Length::Vw(2.0)));
        assert_eq!("10vh".parse(), Ok(Length::Vh(10.0)));
        assert_eq!("0".parse(), Ok(Length::ZERO));
    }

    #[test]
    fn rejects_unitless_and_unknown() {
        assert!(matches!(
            "12".parse::<Length>(),
            Err(LengthParseError::MissingUnit(_))
        ));
        assert!(matches!(
            "12pt".parse::<Length>(),
            Err(LengthParseError::UnknownUnit(_))
        ));
        assert!(matches!(
            "px".parse::<Length>(),
            Err(LengthParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn zero_prints_without_unit() {
        assert_eq!(Length::Px(0.0).to_string(), "0");
        assert_eq!(Length::Px(12.0).to_string(), "12px");
        assert_eq!(Length::Rem(0.75).to_string(), "0.75rem");
        assert_eq!(Length::Em(1.5).to_string(), "1.5em");
    }
}
