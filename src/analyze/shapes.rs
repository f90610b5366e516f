//! Geometric helpers: bounding boxes, solid rectangles, symmetry.

use std::collections::HashSet;

use serde::Serialize;

/// Mirror symmetry of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    /// Left-right mirroring
    X,
    /// Top-bottom mirroring
    Y,
    /// Both axes
    XY,
}

/// Bounding box of a pixel set as (min_x, min_y, max_x, max_y).
pub fn bounding_box(pixels: &HashSet<(i32, i32)>) -> Option<(i32, i32, i32, i32)> {
    let mut iter = pixels.iter();
    let &(x, y) = iter.next()?;
    let mut bounds = (x, y, x, y);
    for &(x, y) in iter {
        bounds.0 = bounds.0.min(x);
        bounds.1 = bounds.1.min(y);
        bounds.2 = bounds.2.max(x);
        bounds.3 = bounds.3.max(y);
    }
    Some(bounds)
}

/// If the pixel set exactly fills its bounding box, return it as
/// `[x, y, width, height]`.
pub fn solid_rect(pixels: &HashSet<(i32, i32)>) -> Option<[i64; 4]> {
    let (min_x, min_y, max_x, max_y) = bounding_box(pixels)?;
    let width = (max_x - min_x + 1) as i64;
    let height = (max_y - min_y + 1) as i64;
    if pixels.len() as i64 == width * height {
        Some([min_x as i64, min_y as i64, width, height])
    } else {
        None
    }
}

/// Detect mirror symmetry in an RGBA buffer.
pub fn detect_symmetry(pixels: &[u8], width: u32, height: u32) -> Option<Symmetry> {
    let width = width as usize;
    let height = height as usize;
    if width == 0 || height == 0 || pixels.len() != width * height * 4 {
        return None;
    }

    let x_symmetric = is_x_symmetric(pixels, width, height);
    let y_symmetric = is_y_symmetric(pixels, width, height);

    match (x_symmetric, y_symmetric) {
        (true, true) => Some(Symmetry::XY),
        (true, false) => Some(Symmetry::X),
        (false, true) => Some(Symmetry::Y),
        (false, false) => None,
    }
}

fn is_x_symmetric(pixels: &[u8], width: usize, height: usize) -> bool {
    for y in 0..height {
        for x in 0..width / 2 {
            let left = (y * width + x) * 4;
            let right = (y * width + (width - 1 - x)) * 4;
            if pixels[left..left + 4] != pixels[right..right + 4] {
                return false;
            }
        }
    }
    true
}

fn is_y_symmetric(pixels: &[u8], width: usize, height: usize) -> bool {
    for y in 0..height / 2 {
        let top = y * width * 4;
        let bottom = (height - 1 - y) * width * 4;
        if pixels[top..top + width * 4] != pixels[bottom..bottom + width * 4] {
            return false;
        }
    }
    true
}
