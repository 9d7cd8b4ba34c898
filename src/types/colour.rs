//! Background colour type and parsing.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::{ImpError, Result};

/// An RGBA colour used to matte transparent regions when scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Contact sheet backdrop.
    pub const SHEET_GRAY: Self = Self::rgb(55, 55, 55);

    /// Parse a manifest colour of the form `red:green:blue` or
    /// `red:green:blue:alpha`, each component 0-255.
    pub fn from_components(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(ImpError::Parse {
                message: format!("Invalid colour '{}'", s),
                help: Some("Use red:green:blue or red:green:blue:alpha (0-255)".to_string()),
            });
        }

        let mut values = [255u8; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse::<u8>().map_err(|_| ImpError::Parse {
                message: format!("Invalid colour component '{}' in '{}'", part, s),
                help: Some("Components must be integers between 0 and 255".to_string()),
            })?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// Convert to RGBA array.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Check if the colour is fully transparent.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl From<Colour> for Rgba<u8> {
    fn from(c: Colour) -> Self {
        Rgba(c.to_rgba())
    }
}

impl FromStr for Colour {
    type Err = ImpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_components(s)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "{}:{}:{}", self.r, self.g, self.b)
        } else {
            write!(f, "{}:{}:{}:{}", self.r, self.g, self.b, self.a)
        }
    }
}
