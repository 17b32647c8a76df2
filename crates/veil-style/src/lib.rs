#![forbid(unsafe_code)]

//! Style primitives for Veil.
//!
//! This crate provides:
//! - [`Color`] for RGBA colors with CSS parsing and formatting
//! - [`Length`] for CSS lengths
//! - [`InlineStyle`] for ordered per-element style declarations

pub mod color;
pub mod inline;
pub mod length;

pub use color::{Color, ColorParseError};
pub use inline::InlineStyle;
pub use length::{Length, LengthParseError};
