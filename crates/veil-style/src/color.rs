#![forbid(unsafe_code)]

//! RGBA colors with CSS-compatible parsing and formatting.
//!
//! Accepted inputs:
//!
//! | Form | Example |
//! |------|---------|
//! | Short hex | `#fff`, `#fffa` |
//! | Long hex | `#2a2a2a`, `#00000066` |
//! | Functional | `rgb(0, 0, 0)`, `rgba(0, 0, 0, 0.4)` |
//! | Keywords | `transparent` and the CSS basic named colors (`red`, `navy`, `gray`, ...) |
//!
//! Formatting is canonical: opaque colors print as `#rrggbb`, anything with
//! alpha prints as `rgba(r, g, b, a)` with at most three alpha decimals.

use std::fmt;
use std::str::FromStr;

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scale the alpha channel by `opacity` (clamped to `[0.0, 1.0]`).
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        let a = (f32::from(self.a) * opacity).round() as u8;
        Self { a, ..self }
    }

    /// Alpha as a fraction in `[0.0, 1.0]`.
    #[must_use]
    pub fn alpha(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// CSS text for this color.
    #[must_use]
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_alpha(self.alpha())
            )
        }
    }
}

fn format_alpha(alpha: f32) -> String {
    let text = format!("{alpha:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Errors from [`Color::from_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Input was empty or whitespace.
    Empty,
    /// A `#` color with a length other than 3, 4, 6, or 8 digits, or a non-hex digit.
    InvalidHex(String),
    /// An `rgb()`/`rgba()` call with the wrong arity or an out-of-range channel.
    InvalidFunction(String),
    /// Not a recognised color form.
    Unknown(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty color"),
            Self::InvalidHex(s) => write!(f, "invalid hex color: {s}"),
            Self::InvalidFunction(s) => write!(f, "invalid rgb()/rgba() color: {s}"),
            Self::Unknown(s) => write!(f, "unrecognised color: {s}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(s.to_string()));
        }

        let lower = s.to_ascii_lowercase();
        if let Some(color) = named(&lower) {
            return Ok(color);
        }

        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_function(args).ok_or_else(|| ColorParseError::InvalidFunction(s.to_string()));
        }

        Err(ColorParseError::Unknown(s.to_string()))
    }
}

/// CSS Level 2 color keywords.
fn named(name: &str) -> Option<Color> {
    let color = match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "silver" => Color::rgb(0xc0, 0xc0, 0xc0),
        "gray" | "grey" => Color::rgb(0x80, 0x80, 0x80),
        "maroon" => Color::rgb(0x80, 0, 0),
        "red" => Color::rgb(0xff, 0, 0),
        "purple" => Color::rgb(0x80, 0, 0x80),
        "fuchsia" => Color::rgb(0xff, 0, 0xff),
        "green" => Color::rgb(0, 0x80, 0),
        "lime" => Color::rgb(0, 0xff, 0),
        "olive" => Color::rgb(0x80, 0x80, 0),
        "yellow" => Color::rgb(0xff, 0xff, 0),
        "navy" => Color::rgb(0, 0, 0x80),
        "blue" => Color::rgb(0, 0, 0xff),
        "teal" => Color::rgb(0, 0x80, 0x80),
        "aqua" => Color::rgb(0, 0xff, 0xff),
        "orange" => Color::rgb(0xff, 0xa5, 0),
        _ => return None,
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = nibble(0)? * 17;
            let g = nibble(1)? * 17;
            let b = nibble(2)? * 17;
            let a = if hex.len() == 4 { nibble(3)? * 17 } else { 255 };
            Some(Color::rgba(r, g, b, a))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, a))
        }
        _ => None,
    }
}

fn parse_function(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<u8>().ok();
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(alpha) => {
            let alpha: f32 = alpha.parse().ok()?;
            if !(0.0..=1.0).contains(&alpha) {
                return None;
            }
            (alpha * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Color::rgba(r, g, b, a))
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
