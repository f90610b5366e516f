//! Semantic naming hints for imported tokens.
//!
//! Suggests readable token names from a region's position, color class and
//! inferred role. Hints are advisory; the importer keeps the generated
//! `c1..cN` tokens and reports these separately.

use std::collections::{HashMap, HashSet};

use super::quantize::LabColor;
use super::{NamingHint, TRANSPARENT_TOKEN};
use crate::analyze::Role;

/// Coarse location of a region within the sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SemanticPosition {
    TopCenter,
    Center,
    Bottom,
    Edge,
    TopCorner,
    Surrounding,
}

/// Classify where a region sits, with a confidence in [0, 1].
pub(crate) fn analyze_semantic_position(
    pixels: &HashSet<(i32, i32)>,
    width: u32,
    height: u32,
) -> (SemanticPosition, f64) {
    if pixels.is_empty() {
        return (SemanticPosition::Edge, 0.0);
    }

    let coverage = pixels.len() as f64 / (width * height) as f64;
    if coverage > 0.5 {
        return (SemanticPosition::Surrounding, 0.9);
    }

    let sum_x: i64 = pixels.iter().map(|&(x, _)| x as i64).sum();
    let sum_y: i64 = pixels.iter().map(|&(_, y)| y as i64).sum();
    let norm_x = sum_x as f64 / pixels.len() as f64 / width as f64;
    let norm_y = sum_y as f64 / pixels.len() as f64 / height as f64;

    let touches = [
        pixels.iter().any(|&(x, _)| x == 0),
        pixels.iter().any(|&(x, _)| x == width as i32 - 1),
        pixels.iter().any(|&(_, y)| y == 0),
        pixels.iter().any(|&(_, y)| y == height as i32 - 1),
    ];
    let edge_count = touches.iter().filter(|&&t| t).count();
    if edge_count >= 2 && coverage > 0.15 {
        return (SemanticPosition::Surrounding, 0.8);
    }

    let is_center_x = (0.25..0.75).contains(&norm_x);
    if is_center_x && norm_y < 0.33 {
        (SemanticPosition::TopCenter, 0.7)
    } else if is_center_x && norm_y < 0.66 {
        (SemanticPosition::Center, 0.7)
    } else if is_center_x {
        (SemanticPosition::Bottom, 0.7)
    } else if norm_y < 0.33 {
        (SemanticPosition::TopCorner, 0.6)
    } else {
        (SemanticPosition::Edge, 0.5)
    }
}

/// Skin tones sit in a warm, mid-lightness band of Lab space.
pub(crate) fn is_skin_tone(color: &[u8; 4]) -> bool {
    let lab = LabColor::from_rgb(color[0], color[1], color[2]);
    lab.l > 40.0 && lab.l < 90.0 && lab.a > 5.0 && lab.a < 40.0 && lab.b > 5.0 && lab.b < 50.0
}

pub(crate) fn is_dark_color(color: &[u8; 4]) -> bool {
    LabColor::from_rgb(color[0], color[1], color[2]).l < 35.0
}

pub(crate) fn is_light_color(color: &[u8; 4]) -> bool {
    LabColor::from_rgb(color[0], color[1], color[2]).l > 85.0
}

/// Produce naming hints for every non-transparent token.
pub(crate) fn generate_naming_hints(
    roles: &HashMap<String, Role>,
    token_pixels: &HashMap<String, HashSet<(i32, i32)>>,
    token_colors: &HashMap<String, [u8; 4]>,
    width: u32,
    height: u32,
) -> Vec<NamingHint> {
    let total_pixels = (width * height) as usize;
    let mut tokens: Vec<&String> = token_pixels.keys().collect();
    tokens.sort();

    let mut hints = Vec::new();
    for token in tokens {
        if token == TRANSPARENT_TOKEN {
            continue;
        }
        let pixels = &token_pixels[token];
        let (position, position_confidence) = analyze_semantic_position(pixels, width, height);
        let coverage = pixels.len() as f64 / total_pixels as f64;

        let (suggested, reason) = suggest_semantic_name(
            position,
            position_confidence,
            token_colors.get(token),
            roles.get(token),
            pixels.len(),
            coverage,
        );
        if let Some(suggested_name) = suggested {
            if token != &suggested_name {
                hints.push(NamingHint { token: token.clone(), suggested_name, reason });
            }
        }
    }
    hints
}

fn suggest_semantic_name(
    position: SemanticPosition,
    position_confidence: f64,
    color: Option<&[u8; 4]>,
    role: Option<&Role>,
    size: usize,
    coverage: f64,
) -> (Option<String>, String) {
    if coverage > 0.4 || position == SemanticPosition::Surrounding {
        return (Some("bg".to_string()), "Large coverage, likely background".to_string());
    }

    if let Some(c) = color {
        if is_skin_tone(c) {
            if position == SemanticPosition::Center {
                return (Some("face".to_string()), "Skin tone in center region".to_string());
            }
            if position == SemanticPosition::TopCenter {
                return (Some("skin".to_string()), "Skin tone in upper region".to_string());
            }
            if coverage > 0.05 {
                return (Some("skin".to_string()), "Detected skin tone color".to_string());
            }
        }

        if is_dark_color(c) {
            if position == SemanticPosition::TopCenter {
                return (Some("hair".to_string()), "Dark color in top center".to_string());
            }
            if size <= 6 && position == SemanticPosition::Center {
                return (Some("eye".to_string()), "Small dark region in center".to_string());
            }
            if matches!(role, Some(Role::Boundary)) {
                return (Some("outline".to_string()), "Dark boundary region".to_string());
            }
            if matches!(role, Some(Role::Shadow)) {
                return (Some("shadow".to_string()), "Dark shadow region".to_string());
            }
            if position == SemanticPosition::Edge {
                return (Some("outline".to_string()), "Dark edge region".to_string());
            }
        }

        if is_light_color(c) {
            if matches!(role, Some(Role::Highlight)) {
                return (Some("highlight".to_string()), "Light highlight region".to_string());
            }
            if size <= 4 {
                return (Some("gleam".to_string()), "Small light region (reflection)".to_string());
            }
        }
    }

    if size == 1 {
        return (Some("dot".to_string()), "Single pixel feature".to_string());
    }
    if size <= 4 {
        if position == SemanticPosition::Center {
            return (Some("eye".to_string()), "Small centered feature".to_string());
        }
        return (Some("detail".to_string()), "Small detail region".to_string());
    }

    match position {
        SemanticPosition::TopCenter if position_confidence > 0.6 => {
            (Some("top".to_string()), "Top center region".to_string())
        }
        SemanticPosition::Center if position_confidence > 0.6 => {
            (Some("body".to_string()), "Central body region".to_string())
        }
        SemanticPosition::Bottom if position_confidence > 0.6 => {
            (Some("base".to_string()), "Bottom base region".to_string())
        }
        _ => match role {
            Some(r) => {
                let name = match r {
                    Role::Boundary => "outline",
                    Role::Anchor => "marker",
                    Role::Fill => "fill",
                    Role::Shadow => "shadow",
                    Role::Highlight => "highlight",
                };
                (Some(name.to_string()), format!("Detected as {} role", r))
            }
            None => (None, String::new()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x0: i32, y0: i32, x1: i32, y1: i32) -> HashSet<(i32, i32)> {
        let mut pixels = HashSet::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                pixels.insert((x, y));
            }
        }
        pixels
    }

    #[test]
    fn dominant_region_is_surrounding() {
        let pixels = block(0, 0, 9, 6);
        let (position, confidence) = analyze_semantic_position(&pixels, 10, 10);
        assert_eq!(position, SemanticPosition::Surrounding);
        assert!(confidence >= 0.8);
    }

    #[test]
    fn centered_region_is_center() {
        let pixels = block(4, 4, 6, 6);
        let (position, _) = analyze_semantic_position(&pixels, 10, 10);
        assert_eq!(position, SemanticPosition::Center);
    }

    #[test]
    fn color_classes() {
        assert!(is_skin_tone(&[255, 220, 185, 255]));
        assert!(!is_skin_tone(&[0, 0, 255, 255]));
        assert!(is_dark_color(&[20, 20, 20, 255]));
        assert!(is_light_color(&[250, 250, 250, 255]));
    }

    #[test]
    fn dark_top_center_suggests_hair() {
        let pixels = block(4, 0, 7, 2);
        let token_pixels: HashMap<String, HashSet<(i32, i32)>> =
            [("c1".to_string(), pixels)].into_iter().collect();
        let token_colors: HashMap<String, [u8; 4]> =
            [("c1".to_string(), [15, 10, 5, 255])].into_iter().collect();
        let hints =
            generate_naming_hints(&HashMap::new(), &token_pixels, &token_colors, 12, 12);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].suggested_name, "hair");
    }

    #[test]
    fn transparent_token_gets_no_hint() {
        let token_pixels: HashMap<String, HashSet<(i32, i32)>> =
            [(TRANSPARENT_TOKEN.to_string(), block(0, 0, 9, 9))].into_iter().collect();
        let hints =
            generate_naming_hints(&HashMap::new(), &token_pixels, &HashMap::new(), 10, 10);
        assert!(hints.is_empty());
    }
}
