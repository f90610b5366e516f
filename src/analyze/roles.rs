//! Heuristic role labels for imported regions.
//!
//! Roles are inferred from pixel count share, edge adjacency and local
//! contrast. Each inference carries a confidence in [0, 1].

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::shapes::bounding_box;

/// Semantic role of a token's pixels within a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Thin region hugging the sprite edge
    Boundary,
    /// Tiny isolated marker (under 4 pixels)
    Anchor,
    /// Large interior area
    Fill,
    /// Darker than its surroundings
    Shadow,
    /// Lighter than its surroundings
    Highlight,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Boundary => "boundary",
            Role::Anchor => "anchor",
            Role::Fill => "fill",
            Role::Shadow => "shadow",
            Role::Highlight => "highlight",
        };
        write!(f, "{}", name)
    }
}

/// A role guess with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleInference {
    pub role: Role,
    pub confidence: f64,
}

impl RoleInference {
    fn new(role: Role, confidence: f64) -> Self {
        Self { role, confidence: confidence.clamp(0.0, 1.0) }
    }
}

/// Perceived brightness of an RGBA color in [0, 1].
pub(crate) fn color_brightness(color: [u8; 4]) -> f64 {
    let [r, g, b, _] = color;
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}

fn infer_boundary(
    pixels: &HashSet<(i32, i32)>,
    width: u32,
    height: u32,
) -> Option<RoleInference> {
    let (min_x, min_y, max_x, max_y) = bounding_box(pixels)?;
    let is_thin = max_x - min_x == 0 || max_y - min_y == 0;

    let edge_pixels = pixels
        .iter()
        .filter(|(x, y)| {
            *x == 0 || *y == 0 || *x == width as i32 - 1 || *y == height as i32 - 1
        })
        .count();
    let edge_ratio = edge_pixels as f64 / pixels.len() as f64;

    if edge_pixels > 0 && is_thin {
        return Some(RoleInference::new(Role::Boundary, (edge_ratio * 0.7 + 0.3).min(1.0)));
    }
    if edge_ratio > 0.7 {
        return Some(RoleInference::new(Role::Boundary, edge_ratio * 0.8));
    }
    None
}

fn infer_anchor(pixels: &HashSet<(i32, i32)>) -> Option<RoleInference> {
    let confidence = match pixels.len() {
        1 => 1.0,
        2 => 0.9,
        3 => 0.8,
        _ => return None,
    };
    Some(RoleInference::new(Role::Anchor, confidence))
}

fn infer_fill(pixels: &HashSet<(i32, i32)>, width: u32, height: u32) -> Option<RoleInference> {
    let area = (width * height) as f64;
    if area == 0.0 {
        return None;
    }
    let size_ratio = pixels.len() as f64 / area;
    if size_ratio < 0.05 {
        return None;
    }

    let interior = pixels
        .iter()
        .filter(|(x, y)| {
            *x > 0 && *y > 0 && *x < width as i32 - 1 && *y < height as i32 - 1
        })
        .count();
    let interior_ratio = interior as f64 / pixels.len() as f64;
    if interior_ratio < 0.5 {
        return None;
    }

    let confidence = (size_ratio.min(0.5) * 2.0 * 0.4 + interior_ratio * 0.6).min(1.0);
    Some(RoleInference::new(Role::Fill, confidence))
}

fn infer_contrast(color: [u8; 4], others: &[[u8; 4]]) -> Option<RoleInference> {
    if others.is_empty() {
        return None;
    }
    let own = color_brightness(color);
    let surrounding =
        others.iter().map(|c| color_brightness(*c)).sum::<f64>() / others.len() as f64;
    let diff = own - surrounding;
    if diff.abs() < 0.15 {
        return None;
    }
    let confidence = ((diff.abs() - 0.15) / 0.25 * 0.3 + 0.7).min(1.0);
    let role = if diff < 0.0 { Role::Shadow } else { Role::Highlight };
    Some(RoleInference::new(role, confidence))
}

/// Infer a role for one region, trying the most specific signals first.
fn infer_role(
    pixels: &HashSet<(i32, i32)>,
    width: u32,
    height: u32,
    color: Option<[u8; 4]>,
    other_colors: &[[u8; 4]],
) -> Option<RoleInference> {
    if pixels.is_empty() {
        return None;
    }
    infer_boundary(pixels, width, height)
        .or_else(|| infer_anchor(pixels))
        .or_else(|| color.and_then(|c| infer_contrast(c, other_colors)))
        .or_else(|| infer_fill(pixels, width, height))
}

/// Infer roles for every region of a sprite.
pub fn infer_roles_batch(
    regions: &HashMap<String, (HashSet<(i32, i32)>, Option<[u8; 4]>)>,
    width: u32,
    height: u32,
) -> HashMap<String, RoleInference> {
    let all_colors: Vec<[u8; 4]> = regions.values().filter_map(|(_, color)| *color).collect();

    let mut inferences = HashMap::new();
    for (name, (pixels, color)) in regions {
        let others: Vec<[u8; 4]> = all_colors
            .iter()
            .filter(|c| color.map(|own| **c != own).unwrap_or(true))
            .copied()
            .collect();
        if let Some(inference) = infer_role(pixels, width, height, *color, &others) {
            inferences.insert(name.clone(), inference);
        }
    }
    inferences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_set(points: &[(i32, i32)]) -> HashSet<(i32, i32)> {
        points.iter().copied().collect()
    }

    #[test]
    fn thin_edge_region_is_boundary() {
        let pixels = pixel_set(&[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let inference = infer_role(&pixels, 4, 4, None, &[]).unwrap();
        assert_eq!(inference.role, Role::Boundary);
        assert!(inference.confidence > 0.5);
    }

    #[test]
    fn single_pixel_is_anchor() {
        let pixels = pixel_set(&[(2, 2)]);
        let inference = infer_role(&pixels, 8, 8, None, &[]).unwrap();
        assert_eq!(inference.role, Role::Anchor);
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn large_interior_region_is_fill() {
        let mut pixels = HashSet::new();
        for y in 1..7 {
            for x in 1..7 {
                pixels.insert((x, y));
            }
        }
        let inference = infer_role(&pixels, 8, 8, None, &[]).unwrap();
        assert_eq!(inference.role, Role::Fill);
    }

    #[test]
    fn dark_among_light_is_shadow() {
        let pixels = pixel_set(&[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let dark = [20, 20, 20, 255];
        let others = [[230, 230, 230, 255], [240, 240, 240, 255]];
        let inference = infer_role(&pixels, 16, 16, Some(dark), &others).unwrap();
        assert_eq!(inference.role, Role::Shadow);
    }

    #[test]
    fn light_among_dark_is_highlight() {
        let pixels = pixel_set(&[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let light = [250, 250, 250, 255];
        let others = [[20, 20, 20, 255]];
        let inference = infer_role(&pixels, 16, 16, Some(light), &others).unwrap();
        assert_eq!(inference.role, Role::Highlight);
    }

    #[test]
    fn brightness_is_luma_weighted() {
        assert!(color_brightness([0, 255, 0, 255]) > color_brightness([0, 0, 255, 255]));
        assert_eq!(color_brightness([0, 0, 0, 255]), 0.0);
    }
}
