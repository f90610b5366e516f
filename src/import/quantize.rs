//! Palette reduction for imported images.
//!
//! Counts exact colors in scan order, then merges the least frequent color
//! into its perceptually nearest survivor (CIE76 distance in Lab space)
//! until the census fits the color budget. Fully transparent pixels share
//! one slot regardless of their RGB values.

use std::collections::HashMap;

/// One RGBA color as sampled from the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn from_rgba(rgba: [u8; 4]) -> Self {
        Self { r: rgba[0], g: rgba[1], b: rgba[2], a: rgba[3] }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Canonical lowercase hex, 6 digits when fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

/// CIE Lab coordinates, D65 illuminant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LabColor {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl LabColor {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r_lin = srgb_to_linear(r as f64 / 255.0);
        let g_lin = srgb_to_linear(g as f64 / 255.0);
        let b_lin = srgb_to_linear(b as f64 / 255.0);

        let x = r_lin * 0.4124564 + g_lin * 0.3575761 + b_lin * 0.1804375;
        let y = r_lin * 0.2126729 + g_lin * 0.7151522 + b_lin * 0.0721750;
        let z = r_lin * 0.0193339 + g_lin * 0.1191920 + b_lin * 0.9503041;

        // D65 reference white
        let fx = lab_f(x / 0.95047);
        let fy = lab_f(y / 1.00000);
        let fz = lab_f(z / 1.08883);

        Self { l: 116.0 * fy - 16.0, a: 500.0 * (fx - fy), b: 200.0 * (fy - fz) }
    }

    /// CIE76 Delta E.
    pub fn distance(&self, other: &LabColor) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    let delta: f64 = 6.0 / 29.0;
    if t > delta.powi(3) {
        t.cbrt()
    } else {
        t / (3.0 * delta * delta) + 4.0 / 29.0
    }
}

/// Census entry: how often a color occurs and where it first appeared.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColorStats {
    pub count: u64,
    pub first_index: usize,
}

/// Exact color census in scan order. Every fully transparent pixel is
/// folded into the single `Color { a: 0, .. }` slot.
pub(crate) fn census(pixels: &[u8]) -> HashMap<Color, ColorStats> {
    let mut stats: HashMap<Color, ColorStats> = HashMap::new();
    for (index, chunk) in pixels.chunks_exact(4).enumerate() {
        let mut color = Color { r: chunk[0], g: chunk[1], b: chunk[2], a: chunk[3] };
        if color.is_transparent() {
            color = Color { r: 0, g: 0, b: 0, a: 0 };
        }
        let entry = stats.entry(color).or_insert(ColorStats { count: 0, first_index: index });
        entry.count += 1;
    }
    stats
}

/// Reduce the census to at most `max_colors` entries by repeated merging.
///
/// The victim is the least frequent color (on a tie, the one seen latest);
/// its counts move to the nearest surviving opaque color by CIE76 distance
/// (on a tie, the one seen earliest). The transparent slot is never merged
/// and consumes one slot of the budget when present. Returns the surviving
/// colors plus a remap from every original color to its survivor.
pub(crate) fn quantize(
    stats: &HashMap<Color, ColorStats>,
    max_colors: usize,
) -> (HashMap<Color, ColorStats>, HashMap<Color, Color>) {
    let mut remap: HashMap<Color, Color> = stats.keys().map(|&c| (c, c)).collect();

    let transparent: Option<(Color, ColorStats)> =
        stats.iter().find(|(c, _)| c.is_transparent()).map(|(&c, &s)| (c, s));
    let opaque_budget = if transparent.is_some() {
        max_colors.saturating_sub(1)
    } else {
        max_colors
    };

    let mut survivors: Vec<(Color, ColorStats, LabColor)> = stats
        .iter()
        .filter(|(c, _)| !c.is_transparent())
        .map(|(&c, &s)| (c, s, LabColor::from_rgb(c.r, c.g, c.b)))
        .collect();

    while survivors.len() > opaque_budget.max(1) && survivors.len() > 1 {
        let victim_idx = survivors
            .iter()
            .enumerate()
            .min_by(|(_, (_, sa, _)), (_, (_, sb, _))| {
                sa.count.cmp(&sb.count).then(sb.first_index.cmp(&sa.first_index))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let (victim, victim_stats, victim_lab) = survivors.remove(victim_idx);

        let target_idx = survivors
            .iter()
            .enumerate()
            .min_by(|(_, (_, sa, la)), (_, (_, sb, lb))| {
                victim_lab
                    .distance(la)
                    .partial_cmp(&victim_lab.distance(lb))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(sa.first_index.cmp(&sb.first_index))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);

        let target = survivors[target_idx].0;
        survivors[target_idx].1.count += victim_stats.count;
        survivors[target_idx].1.first_index =
            survivors[target_idx].1.first_index.min(victim_stats.first_index);

        for mapped in remap.values_mut() {
            if *mapped == victim {
                *mapped = target;
            }
        }
    }

    let mut result: HashMap<Color, ColorStats> =
        survivors.into_iter().map(|(c, s, _)| (c, s)).collect();
    if let Some((c, s)) = transparent {
        result.insert(c, s);
    }
    (result, remap)
}

/// Order surviving colors for token assignment: most frequent first, ties
/// broken by earliest first occurrence. Transparent sorts with the rest but
/// callers give it the reserved `_` token.
pub(crate) fn token_order(stats: &HashMap<Color, ColorStats>) -> Vec<Color> {
    let mut colors: Vec<(Color, ColorStats)> = stats.iter().map(|(&c, &s)| (c, s)).collect();
    colors.sort_by(|(_, a), (_, b)| {
        b.count.cmp(&a.count).then(a.first_index.cmp(&b.first_index))
    });
    colors.into_iter().map(|(c, _)| c).collect()
}
