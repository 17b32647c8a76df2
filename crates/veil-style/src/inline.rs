#![forbid(unsafe_code)]

//! Ordered inline style declarations, the equivalent of an element's `style`
//! attribute.
//!
//! # Invariants
//!
//! 1. Each property appears at most once; `set` on an existing property
//!    replaces its value in place (declaration order is stable).
//! 2. `to_css()` renders declarations in insertion order.

use std::fmt;

use crate::{Color, Length};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        if let Some(slot) = self
            .declarations
            .iter_mut()
            .find(|(name, _)| *name == property)
        {
            slot.1 = value;
        } else {
            self.declarations.push((property, value));
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let idx = self.declarations.iter().position(|(name, _)| name == property)?;
        Some(self.declarations.remove(idx).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn set_color(&mut self, property: impl Into<String>, color: Color) {
        self.set(property, color.to_css());
    }

    pub fn set_length(&mut self, property: impl Into<String>, length: Length) {
        self.set(property, length.to_string());
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.set("opacity", opacity.to_string());
    }

    /// `property: value; property: value` form.
    #[must_use]
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InlineStyle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Self::new();
        for (k, v) in iter {
            style.set(k, v);
        }
        style
    }
}
