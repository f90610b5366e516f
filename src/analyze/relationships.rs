//! Pairwise relationships between imported regions.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::shapes::bounding_box;

/// Kind of relation between two regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    /// Same hue, different lightness
    DerivesFrom,
    /// Spatially nested inside the other region
    ContainedWithin,
    /// Shares a boundary with the other region
    AdjacentTo,
    /// Mirrored counterpart across the vertical midline
    PairedWith,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipType::DerivesFrom => "derives-from",
            RelationshipType::ContainedWithin => "contained-within",
            RelationshipType::AdjacentTo => "adjacent-to",
            RelationshipType::PairedWith => "paired-with",
        };
        write!(f, "{}", name)
    }
}

/// One inferred relation with a confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub source: String,
    pub relationship: RelationshipType,
    pub target: String,
    pub confidence: f64,
}

impl Relationship {
    fn new(
        source: &str,
        relationship: RelationshipType,
        target: &str,
        confidence: f64,
    ) -> Self {
        Self {
            source: source.to_string(),
            relationship,
            target: target.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Region input for relationship inference.
#[derive(Debug, Clone)]
pub struct RegionData {
    pub name: String,
    pub pixels: HashSet<(i32, i32)>,
    pub color: [u8; 4],
}

struct Hsl {
    h: f64,
    s: f64,
    l: f64,
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl { h: h * 60.0, s, l }
}

fn derives_from(a: &RegionData, b: &RegionData) -> Option<Relationship> {
    let source = rgb_to_hsl(a.color[0], a.color[1], a.color[2]);
    let target = rgb_to_hsl(b.color[0], b.color[1], b.color[2]);

    let hue_diff = {
        let diff = (source.h - target.h).abs();
        diff.min(360.0 - diff)
    };
    let sat_diff = (source.s - target.s).abs();
    let light_diff = (source.l - target.l).abs();

    if hue_diff > 15.0 || sat_diff > 0.15 || light_diff < 0.1 {
        return None;
    }

    let hue_score = 1.0 - hue_diff / 15.0;
    let sat_score = 1.0 - sat_diff / 0.15;
    let light_score = (light_diff - 0.1).min(0.4) / 0.4;
    let confidence = (hue_score * 0.3 + sat_score * 0.3 + light_score * 0.4).min(1.0);
    if confidence < 0.5 {
        return None;
    }

    Some(Relationship::new(&a.name, RelationshipType::DerivesFrom, &b.name, confidence))
}

fn contained_within(inner: &RegionData, outer: &RegionData) -> Option<Relationship> {
    let (in_min_x, in_min_y, in_max_x, in_max_y) = bounding_box(&inner.pixels)?;
    let (out_min_x, out_min_y, out_max_x, out_max_y) = bounding_box(&outer.pixels)?;

    let bbox_contained = in_min_x >= out_min_x
        && in_min_y >= out_min_y
        && in_max_x <= out_max_x
        && in_max_y <= out_max_y;
    if !bbox_contained {
        return None;
    }

    let surrounded = inner
        .pixels
        .iter()
        .filter(|&&(x, y)| {
            [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
                .iter()
                .any(|n| outer.pixels.contains(n))
        })
        .count();
    let ratio = surrounded as f64 / inner.pixels.len() as f64;
    if ratio < 0.5 {
        return None;
    }

    Some(Relationship::new(
        &inner.name,
        RelationshipType::ContainedWithin,
        &outer.name,
        (ratio * 0.7 + 0.3).min(1.0),
    ))
}

fn adjacent_to(a: &RegionData, b: &RegionData) -> Option<Relationship> {
    let boundary = a
        .pixels
        .iter()
        .filter(|&&(x, y)| {
            [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
                .iter()
                .any(|n| b.pixels.contains(n))
        })
        .count();
    if boundary == 0 {
        return None;
    }

    let smaller = a.pixels.len().min(b.pixels.len());
    let ratio = boundary as f64 / smaller as f64;
    Some(Relationship::new(
        &a.name,
        RelationshipType::AdjacentTo,
        &b.name,
        (0.5 + ratio * 0.5).min(1.0),
    ))
}

fn centroid(pixels: &HashSet<(i32, i32)>) -> (f64, f64) {
    let sum = pixels
        .iter()
        .fold((0i64, 0i64), |acc, &(x, y)| (acc.0 + x as i64, acc.1 + y as i64));
    (sum.0 as f64 / pixels.len() as f64, sum.1 as f64 / pixels.len() as f64)
}

fn paired_with(a: &RegionData, b: &RegionData, sprite_width: u32) -> Option<Relationship> {
    let size_a = a.pixels.len();
    let size_b = b.pixels.len();
    let size_ratio = size_a.min(size_b) as f64 / size_a.max(size_b) as f64;
    if size_ratio < 0.8 {
        return None;
    }

    let centroid_a = centroid(&a.pixels);
    let centroid_b = centroid(&b.pixels);
    let expected_mirror_x = sprite_width as f64 - centroid_a.0;
    let x_diff = (centroid_b.0 - expected_mirror_x).abs();
    let y_diff = (centroid_a.1 - centroid_b.1).abs();
    let tolerance = sprite_width as f64 * 0.1;
    if x_diff > tolerance || y_diff > tolerance {
        return None;
    }

    let mirrored: HashSet<(i32, i32)> =
        a.pixels.iter().map(|&(x, y)| (sprite_width as i32 - 1 - x, y)).collect();
    let intersection = mirrored.intersection(&b.pixels).count();
    let union = mirrored.union(&b.pixels).count();
    let shape_similarity = intersection as f64 / union as f64;
    if shape_similarity < 0.5 {
        return None;
    }

    let position_score = 1.0 - (x_diff + y_diff) / (2.0 * tolerance);
    let confidence =
        (size_ratio * 0.2 + shape_similarity * 0.5 + position_score * 0.3).min(1.0);
    if confidence < 0.6 {
        return None;
    }

    Some(Relationship::new(&a.name, RelationshipType::PairedWith, &b.name, confidence))
}

/// Infer all pairwise relations, strongest first.
pub fn infer_relationships_batch(
    regions: &[RegionData],
    sprite_width: u32,
) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for i in 0..regions.len() {
        for j in 0..regions.len() {
            if i == j || regions[i].pixels.is_empty() || regions[j].pixels.is_empty() {
                continue;
            }
            let a = &regions[i];
            let b = &regions[j];

            if let Some(rel) = derives_from(a, b) {
                relationships.push(rel);
            }
            if i < j {
                if let Some(rel) = contained_within(a, b) {
                    relationships.push(rel);
                }
                if let Some(rel) = contained_within(b, a) {
                    relationships.push(rel);
                }
                if let Some(rel) = adjacent_to(a, b) {
                    relationships.push(rel);
                }
                if let Some(rel) = paired_with(a, b, sprite_width) {
                    relationships.push(rel);
                }
            }
        }
    }

    relationships.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });
    relationships
}
