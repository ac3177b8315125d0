// Shared types module - Colors, points and mode exit reasons used across modules

use anyhow::{Context, Result};

// Mode exit reason - tells main whether the user quit or the run completed on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeExitReason {
    UserQuit, // User pressed 'q' or Ctrl+C
    Finished, // Export wrote every requested frame
}

// 2D point in canvas or local wheel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Point at `radius` along `degrees`, measured clockwise from +x in screen space
    pub fn polar(radius: f64, degrees: f64) -> Self {
        let a = degrees.to_radians();
        Point { x: radius * a.cos(), y: radius * a.sin() }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

// RGBA color representation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Rgba { a, ..self }
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            anyhow::bail!("Invalid hex color: {}", hex);
        }
        Ok(Rgba::rgb(
            u8::from_str_radix(&hex[0..2], 16)?,
            u8::from_str_radix(&hex[2..4], 16)?,
            u8::from_str_radix(&hex[4..6], 16)?,
        ))
    }
}

// Parse a comma-separated color string ("FFFFFF,C7EBFF") into opaque colors
pub fn parse_color_list(color_str: &str) -> Result<Vec<Rgba>> {
    color_str
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| Rgba::from_hex(s).with_context(|| format!("bad color '{}' in '{}'", s, color_str)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgba::from_hex("#045783").unwrap(), Rgba::rgb(4, 87, 131));
        assert_eq!(Rgba::from_hex("ff4f9d").unwrap(), Rgba::rgb(255, 79, 157));
        assert!(Rgba::from_hex("#12345").is_err());
        assert!(Rgba::from_hex("GG0000").is_err());
    }

    #[test]
    fn test_parse_color_list() {
        let colors = parse_color_list("FFFFFF, C7EBFF,,").unwrap();
        assert_eq!(colors, vec![Rgba::WHITE, Rgba::rgb(0xC7, 0xEB, 0xFF)]);
        assert!(parse_color_list("FFFFFF,nope").is_err());
    }

    #[test]
    fn test_polar() {
        let p = Point::polar(10.0, 90.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }
}
