//! Pattern detection for imported images: dithering, nearest-neighbor
//! upscaling, dark outlines, and containment-based z ordering.

use std::collections::{HashMap, HashSet};

use super::{DitherInfo, DitherPattern, OutlineInfo, UpscaleInfo, TRANSPARENT_TOKEN};
use crate::analyze::RelationshipType;

/// Derive z values from containment: a region nested inside another paints
/// above it. z = 1 + max(z of containers); uncontained regions get 0.
pub(crate) fn infer_z_order(
    tokens: &[String],
    relationships: &[(String, RelationshipType, String)],
) -> HashMap<String, i64> {
    let mut contained_in: HashMap<&str, Vec<&str>> = HashMap::new();
    for (source, rel_type, target) in relationships {
        if matches!(rel_type, RelationshipType::ContainedWithin) {
            contained_in.entry(source).or_default().push(target);
        }
    }

    fn compute_z<'a>(
        token: &'a str,
        contained_in: &HashMap<&'a str, Vec<&'a str>>,
        z_order: &mut HashMap<String, i64>,
        visiting: &mut HashSet<&'a str>,
    ) -> i64 {
        if let Some(&z) = z_order.get(token) {
            return z;
        }
        // cycle guard
        if !visiting.insert(token) {
            return 0;
        }
        let z = match contained_in.get(token) {
            Some(containers) => {
                1 + containers
                    .iter()
                    .map(|c| compute_z(c, contained_in, z_order, visiting))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        };
        visiting.remove(token);
        z_order.insert(token.to_string(), z);
        z
    }

    let mut z_order = HashMap::new();
    let mut visiting = HashSet::new();
    for token in tokens {
        compute_z(token, &contained_in, &mut z_order, &mut visiting);
    }
    z_order
}

/// Scan every token pair for checkerboard and line dither patterns.
pub(crate) fn detect_dither_patterns(
    token_pixels: &HashMap<String, HashSet<(i32, i32)>>,
    token_colors: &HashMap<String, [u8; 4]>,
) -> Vec<DitherInfo> {
    let mut pixel_to_token: HashMap<(i32, i32), &str> = HashMap::new();
    for (token, pixels) in token_pixels {
        for &p in pixels {
            pixel_to_token.insert(p, token.as_str());
        }
    }

    let mut tokens: Vec<&String> = token_pixels.keys().collect();
    tokens.sort();

    let mut patterns = Vec::new();
    for i in 0..tokens.len() {
        for j in (i + 1)..tokens.len() {
            let (t1, t2) = (tokens[i].as_str(), tokens[j].as_str());
            if t1 == TRANSPARENT_TOKEN || t2 == TRANSPARENT_TOKEN {
                continue;
            }
            let p1 = &token_pixels[tokens[i]];
            let p2 = &token_pixels[tokens[j]];

            for pattern in [
                DitherPattern::Checkerboard,
                DitherPattern::HorizontalLines,
                DitherPattern::VerticalLines,
            ] {
                if let Some(info) = detect_grid_pattern(
                    t1,
                    t2,
                    p1,
                    p2,
                    &pixel_to_token,
                    token_colors,
                    pattern,
                ) {
                    patterns.push(info);
                }
            }
        }
    }
    patterns
}

fn overlap_bounds(
    p1: &HashSet<(i32, i32)>,
    p2: &HashSet<(i32, i32)>,
) -> Option<(i32, i32, i32, i32)> {
    let b1 = crate::analyze::bounding_box(p1)?;
    let b2 = crate::analyze::bounding_box(p2)?;
    let min_x = b1.0.max(b2.0);
    let min_y = b1.1.max(b2.1);
    let max_x = b1.2.min(b2.2);
    let max_y = b1.3.min(b2.3);
    if max_x < min_x || max_y < min_y {
        None
    } else {
        Some((min_x, min_y, max_x, max_y))
    }
}

fn detect_grid_pattern(
    token1: &str,
    token2: &str,
    pixels1: &HashSet<(i32, i32)>,
    pixels2: &HashSet<(i32, i32)>,
    pixel_to_token: &HashMap<(i32, i32), &str>,
    token_colors: &HashMap<String, [u8; 4]>,
    pattern: DitherPattern,
) -> Option<DitherInfo> {
    let (min_x, min_y, max_x, max_y) = overlap_bounds(pixels1, pixels2)?;

    let phase = |x: i32, y: i32| match pattern {
        DitherPattern::Checkerboard => (x + y) % 2 == 0,
        DitherPattern::HorizontalLines => y % 2 == 0,
        DitherPattern::VerticalLines => x % 2 == 0,
    };

    let mut matches = 0u64;
    let mut inverse_matches = 0u64;
    let mut total = 0u64;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let expected = if phase(x, y) { token1 } else { token2 };
            let inverse = if phase(x, y) { token2 } else { token1 };
            if let Some(&actual) = pixel_to_token.get(&(x, y)) {
                total += 1;
                if actual == expected {
                    matches += 1;
                }
                if actual == inverse {
                    inverse_matches += 1;
                }
            }
        }
    }

    let area = ((max_x - min_x + 1) as u64) * ((max_y - min_y + 1) as u64);
    let coverage = total as f64 / area as f64;
    let best = matches.max(inverse_matches);
    let match_ratio = if total > 0 { best as f64 / total as f64 } else { 0.0 };

    // line patterns are stricter than checkerboard and need two full lines
    let accepted = match pattern {
        DitherPattern::Checkerboard => total >= 4 && match_ratio >= 0.8 && coverage >= 0.7,
        DitherPattern::HorizontalLines => {
            total >= 4 && match_ratio >= 0.9 && coverage >= 0.8 && max_y - min_y + 1 >= 2
        }
        DitherPattern::VerticalLines => {
            total >= 4 && match_ratio >= 0.9 && coverage >= 0.8 && max_x - min_x + 1 >= 2
        }
    };
    if !accepted {
        return None;
    }

    let c1 = token_colors.get(token1).copied().unwrap_or([0, 0, 0, 255]);
    let c2 = token_colors.get(token2).copied().unwrap_or([0, 0, 0, 255]);
    let merged = average_colors(&[c1, c2]);

    Some(DitherInfo {
        tokens: vec![token1.to_string(), token2.to_string()],
        pattern,
        bounds: [
            min_x as u32,
            min_y as u32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        ],
        merged_color: format!("#{:02x}{:02x}{:02x}", merged[0], merged[1], merged[2]),
        confidence: match_ratio * coverage,
    })
}

pub(crate) fn average_colors(colors: &[[u8; 4]]) -> [u8; 4] {
    if colors.is_empty() {
        return [0, 0, 0, 255];
    }
    let mut sum = [0u32; 4];
    for c in colors {
        for (acc, component) in sum.iter_mut().zip(c.iter()) {
            *acc += *component as u32;
        }
    }
    let n = colors.len() as u32;
    [
        (sum[0] / n) as u8,
        (sum[1] / n) as u8,
        (sum[2] / n) as u8,
        (sum[3] / n) as u8,
    ]
}

/// Detect nearest-neighbor upscaling by checking whether the raster is a
/// grid of uniform NxN blocks for a common scale factor.
pub(crate) fn detect_upscale(pixels: &[u8], width: u32, height: u32) -> Option<UpscaleInfo> {
    for scale in [2u32, 3, 4, 5, 6, 8] {
        if width % scale != 0 || height % scale != 0 || width < scale || height < scale {
            continue;
        }
        let confidence = uniform_block_ratio(pixels, width, height, scale);
        if confidence >= 0.95 {
            return Some(UpscaleInfo {
                scale,
                native_size: [width / scale, height / scale],
                confidence,
            });
        }
    }
    None
}

fn uniform_block_ratio(pixels: &[u8], width: u32, height: u32, scale: u32) -> f64 {
    let native_width = width / scale;
    let native_height = height / scale;
    let total = (native_width * native_height) as u64;
    if total == 0 {
        return 0.0;
    }

    let mut uniform = 0u64;
    for block_y in 0..native_height {
        for block_x in 0..native_width {
            let base_x = block_x * scale;
            let base_y = block_y * scale;
            let base = ((base_y * width + base_x) * 4) as usize;
            let reference = &pixels[base..base + 4];

            let is_uniform = (0..scale).all(|dy| {
                (0..scale).all(|dx| {
                    let idx = (((base_y + dy) * width + base_x + dx) * 4) as usize;
                    &pixels[idx..idx + 4] == reference
                })
            });
            if is_uniform {
                uniform += 1;
            }
        }
    }
    uniform as f64 / total as f64
}

/// Detect thin dark regions that trace other regions, i.e. outlines.
pub(crate) fn detect_outlines(
    token_pixels: &HashMap<String, HashSet<(i32, i32)>>,
    token_colors: &HashMap<String, [u8; 4]>,
) -> Vec<OutlineInfo> {
    let mut pixel_to_token: HashMap<(i32, i32), &str> = HashMap::new();
    for (token, pixels) in token_pixels {
        for &p in pixels {
            pixel_to_token.insert(p, token.as_str());
        }
    }

    let mut outlines = Vec::new();
    let mut tokens: Vec<&String> = token_pixels.keys().collect();
    tokens.sort();

    for token in tokens {
        let pixels = &token_pixels[token];
        if token == TRANSPARENT_TOKEN || pixels.is_empty() {
            continue;
        }

        let color = token_colors.get(token).copied().unwrap_or([0, 0, 0, 255]);
        let luminosity =
            (0.299 * color[0] as f64 + 0.587 * color[1] as f64 + 0.114 * color[2] as f64) / 255.0;
        if luminosity > 0.3 {
            continue;
        }

        let avg_width = average_stroke_width(pixels);
        if !(0.8..=3.5).contains(&avg_width) {
            continue;
        }

        let mut borders: Vec<String> = {
            let mut set = HashSet::new();
            let directions =
                [(0, 1), (1, 0), (0, -1), (-1, 0), (1, 1), (-1, 1), (1, -1), (-1, -1)];
            for &(x, y) in pixels {
                for (dx, dy) in directions {
                    if let Some(&neighbor) = pixel_to_token.get(&(x + dx, y + dy)) {
                        if neighbor != token.as_str() && neighbor != TRANSPARENT_TOKEN {
                            set.insert(neighbor.to_string());
                        }
                    }
                }
            }
            set.into_iter().collect()
        };
        if borders.is_empty() {
            continue;
        }
        borders.sort();

        let width_score = if (1.0..=2.0).contains(&avg_width) {
            1.0
        } else if avg_width <= 3.0 {
            0.8
        } else {
            0.6
        };
        let border_score = (borders.len() as f64 / 5.0).min(1.0);
        let confidence = (width_score * 0.6 + border_score * 0.4) * (1.0 - luminosity);
        if confidence >= 0.3 {
            outlines.push(OutlineInfo {
                token: token.clone(),
                borders,
                width: avg_width,
                confidence,
            });
        }
    }
    outlines
}

/// Estimate average stroke width as area over half the perimeter, which is
/// close to exact for one-pixel lines.
fn average_stroke_width(pixels: &HashSet<(i32, i32)>) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }
    let area = pixels.len() as f64;
    let perimeter = pixels
        .iter()
        .filter(|&&(x, y)| {
            [(x, y + 1), (x + 1, y), (x, y - 1), (x - 1, y)]
                .iter()
                .any(|n| !pixels.contains(n))
        })
        .count();
    if perimeter == 0 {
        return area.sqrt();
    }
    area / (perimeter as f64 / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_order_without_containment_is_flat() {
        let tokens = vec!["c1".to_string(), "c2".to_string()];
        let z = infer_z_order(&tokens, &[]);
        assert_eq!(z["c1"], 0);
        assert_eq!(z["c2"], 0);
    }

    #[test]
    fn contained_region_paints_above_container() {
        let tokens = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
        let rels = vec![
            ("c2".to_string(), RelationshipType::ContainedWithin, "c1".to_string()),
            ("c3".to_string(), RelationshipType::ContainedWithin, "c2".to_string()),
        ];
        let z = infer_z_order(&tokens, &rels);
        assert_eq!(z["c1"], 0);
        assert_eq!(z["c2"], 1);
        assert_eq!(z["c3"], 2);
    }

    #[test]
    fn containment_cycle_terminates() {
        let tokens = vec!["c1".to_string(), "c2".to_string()];
        let rels = vec![
            ("c1".to_string(), RelationshipType::ContainedWithin, "c2".to_string()),
            ("c2".to_string(), RelationshipType::ContainedWithin, "c1".to_string()),
        ];
        let z = infer_z_order(&tokens, &rels);
        assert_eq!(z.len(), 2);
    }

    #[test]
    fn checkerboard_is_detected() {
        let mut a = HashSet::new();
        let mut b = HashSet::new();
        for y in 0..4 {
            for x in 0..4 {
                if (x + y) % 2 == 0 {
                    a.insert((x, y));
                } else {
                    b.insert((x, y));
                }
            }
        }
        let token_pixels: HashMap<String, HashSet<(i32, i32)>> =
            [("c1".to_string(), a), ("c2".to_string(), b)].into_iter().collect();
        let token_colors: HashMap<String, [u8; 4]> = [
            ("c1".to_string(), [255, 255, 255, 255]),
            ("c2".to_string(), [0, 0, 0, 255]),
        ]
        .into_iter()
        .collect();

        let patterns = detect_dither_patterns(&token_pixels, &token_colors);
        let checker = patterns
            .iter()
            .find(|p| p.pattern == DitherPattern::Checkerboard)
            .expect("checkerboard not found");
        assert_eq!(checker.merged_color, "#7f7f7f");
        assert!(checker.confidence > 0.7);
    }

    #[test]
    fn upscale_of_uniform_blocks_is_detected() {
        // 4x4 image of 2x2 uniform blocks
        let mut pixels = Vec::new();
        for y in 0..4u32 {
            for x in 0..4u32 {
                let color = if (x / 2 + y / 2) % 2 == 0 { 255u8 } else { 0 };
                pixels.extend_from_slice(&[color, color, color, 255]);
            }
        }
        let info = detect_upscale(&pixels, 4, 4).expect("upscale not detected");
        assert_eq!(info.scale, 2);
        assert_eq!(info.native_size, [2, 2]);
        assert!(info.confidence >= 0.95);
    }

    #[test]
    fn noisy_image_is_not_upscaled() {
        let mut pixels = Vec::new();
        for i in 0..16u8 {
            pixels.extend_from_slice(&[i * 16, i, 255 - i, 255]);
        }
        assert!(detect_upscale(&pixels, 4, 4).is_none());
    }

    #[test]
    fn thin_dark_border_is_an_outline() {
        // dark 1px frame around a bright 4x4 fill
        let mut frame = HashSet::new();
        let mut fill = HashSet::new();
        for y in 0..6 {
            for x in 0..6 {
                if x == 0 || y == 0 || x == 5 || y == 5 {
                    frame.insert((x, y));
                } else {
                    fill.insert((x, y));
                }
            }
        }
        let token_pixels: HashMap<String, HashSet<(i32, i32)>> =
            [("c1".to_string(), fill), ("c2".to_string(), frame)].into_iter().collect();
        let token_colors: HashMap<String, [u8; 4]> = [
            ("c1".to_string(), [240, 220, 200, 255]),
            ("c2".to_string(), [10, 10, 10, 255]),
        ]
        .into_iter()
        .collect();

        let outlines = detect_outlines(&token_pixels, &token_colors);
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].token, "c2");
        assert_eq!(outlines[0].borders, vec!["c1".to_string()]);
    }
}
