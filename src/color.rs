//! Color literal parsing, normalization and ramp generation.
//!
//! Accepted input forms:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()`
//! - Named: `red`, `blue`, `transparent`, etc.
//!
//! The canonical textual form is lowercase hex: 6 digits when the color is
//! fully opaque, 8 digits otherwise.

use image::Rgba;
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use thiserror::Error;

/// Error type for color parsing and ramp generation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid hex length (must be 3, 4, 6, or 8 digits after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
    /// Ramp was requested with zero steps
    #[error("steps must be at least 1")]
    InvalidSteps,
}

/// Parse a color literal into an RGBA value.
///
/// Hex strings take a fast path; everything else goes through lightningcss,
/// which covers functional notation and CSS named colors (including
/// `transparent`).
///
/// # Examples
///
/// ```
/// use pxl::color::parse_rgba;
///
/// assert_eq!(parse_rgba("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_rgba("rgb(0, 255, 0)").unwrap(), image::Rgba([0, 255, 0, 255]));
/// assert_eq!(parse_rgba("transparent").unwrap(), image::Rgba([0, 0, 0, 0]));
/// ```
pub fn parse_rgba(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    parse_css(s)
}

/// Parse a color literal and return it in canonical form.
///
/// Canonical means lowercase hex, 6 digits when fully opaque and 8 digits
/// when the alpha channel carries information. Normalization is idempotent.
///
/// # Examples
///
/// ```
/// use pxl::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), "#ff0000");
/// assert_eq!(parse_color("red").unwrap(), "#ff0000");
/// assert_eq!(parse_color("#11223344").unwrap(), "#11223344");
/// ```
pub fn parse_color(s: &str) -> Result<String, ColorError> {
    parse_rgba(s).map(rgba_to_hex)
}

/// Format an RGBA value in the canonical hex form.
pub fn rgba_to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

/// Generate a linear color ramp between two colors.
///
/// Interpolates each channel (alpha included) across `steps` samples,
/// inclusive of both endpoints. `steps == 1` yields only the normalized
/// start color; `steps == 0` is an error.
///
/// # Examples
///
/// ```
/// use pxl::color::generate_ramp;
///
/// let ramp = generate_ramp("#000000", "#ffffff", 3).unwrap();
/// assert_eq!(ramp, vec!["#000000", "#808080", "#ffffff"]);
/// ```
pub fn generate_ramp(from: &str, to: &str, steps: usize) -> Result<Vec<String>, ColorError> {
    if steps == 0 {
        return Err(ColorError::InvalidSteps);
    }

    let start = parse_rgba(from)?;
    if steps == 1 {
        return Ok(vec![rgba_to_hex(start)]);
    }
    let end = parse_rgba(to)?;

    let mut colors = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = i as f64 / (steps - 1) as f64;
        let rgba = Rgba([
            lerp_u8(start.0[0], end.0[0], t),
            lerp_u8(start.0[1], end.0[1], t),
            lerp_u8(start.0[2], end.0[2], t),
            lerp_u8(start.0[3], end.0[3], t),
        ]);
        colors.push(rgba_to_hex(rgba));
    }
    Ok(colors)
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

/// Parse the digits of a hex color (without the leading `#`).
fn parse_hex(hex: &str) -> Result<Rgba<u8>, ColorError> {
    for c in hex.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ColorError::InvalidHex(c));
        }
    }

    match hex.len() {
        3 => {
            let mut chars = hex.chars();
            let r = hex_digit(chars.next().unwrap_or('0'))? * 17;
            let g = hex_digit(chars.next().unwrap_or('0'))? * 17;
            let b = hex_digit(chars.next().unwrap_or('0'))? * 17;
            Ok(Rgba([r, g, b, 255]))
        }
        4 => {
            let mut chars = hex.chars();
            let r = hex_digit(chars.next().unwrap_or('0'))? * 17;
            let g = hex_digit(chars.next().unwrap_or('0'))? * 17;
            let b = hex_digit(chars.next().unwrap_or('0'))? * 17;
            let a = hex_digit(chars.next().unwrap_or('0'))? * 17;
            Ok(Rgba([r, g, b, a]))
        }
        6 => Ok(Rgba([hex_pair(&hex[0..2])?, hex_pair(&hex[2..4])?, hex_pair(&hex[4..6])?, 255])),
        8 => Ok(Rgba([
            hex_pair(&hex[0..2])?,
            hex_pair(&hex[2..4])?,
            hex_pair(&hex[4..6])?,
            hex_pair(&hex[6..8])?,
        ])),
        len => Err(ColorError::InvalidLength(len)),
    }
}

/// Parse a CSS color using lightningcss (rgb, hsl, named colors).
fn parse_css(s: &str) -> Result<Rgba<u8>, ColorError> {
    let css = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    let rgb = css
        .to_rgb()
        .map_err(|_| ColorError::CssParse("cannot convert color to RGB".to_string()))?;
    match rgb {
        CssColor::RGBA(rgba) => Ok(Rgba([rgba.red, rgba.green, rgba.blue, rgba.alpha])),
        _ => Err(ColorError::CssParse("color conversion did not produce RGB".to_string())),
    }
}

fn hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

fn hex_pair(s: &str) -> Result<u8, ColorError> {
    let mut chars = s.chars();
    let high = hex_digit(chars.next().unwrap_or('0'))?;
    let low = hex_digit(chars.next().unwrap_or('0'))?;
    Ok(high * 16 + low)
}
