//! PNG import: rebuild palette, sprite geometry, and an optional analysis
//! report from a decoded raster.
//!
//! The pipeline is decode, color census, palette quantization, token
//! assignment, optional dither folding, connected-component region
//! extraction, and optional structural analysis. Output re-parses through
//! the text pipeline and re-renders to the source dimensions.

mod detection;
mod naming;
mod quantize;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::analyze::{
    detect_symmetry, infer_relationships_batch, infer_roles_batch, solid_rect, RegionData,
    Relationship, Role, Symmetry,
};
use crate::codec::{decode_png_file, CodecError};
use crate::fmt::format_pxl;
use crate::models::{Palette, PaletteRef, PxlObject, RegionDef, Sprite};

use detection::{
    average_colors, detect_dither_patterns, detect_outlines, detect_upscale, infer_z_order,
};
use naming::generate_naming_hints;
use quantize::{census, quantize, token_order, Color};

/// Reserved token for fully transparent pixels.
pub(crate) const TRANSPARENT_TOKEN: &str = "_";

/// Import failure, split by who can fix it.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Image(String),
    #[error("{0}")]
    InvalidOption(String),
}

impl From<CodecError> for ImportError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => ImportError::Io(e),
            CodecError::Format(message) => ImportError::Image(message),
        }
    }
}

/// How detected dither patterns affect region extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherHandling {
    /// Emit every pixel exactly as sampled.
    #[default]
    Keep,
    /// Fold dithered pixel pairs into one averaged token before extraction.
    Merge,
    /// Leave regions as sampled but still report detected patterns.
    Analyze,
}

impl FromStr for DitherHandling {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(DitherHandling::Keep),
            "merge" => Ok(DitherHandling::Merge),
            "analyze" => Ok(DitherHandling::Analyze),
            other => Err(ImportError::InvalidOption(format!(
                "invalid dither_handling: '{}' (expected 'keep', 'merge', or 'analyze')",
                other
            ))),
        }
    }
}

/// Classified dither pattern shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherPattern {
    Checkerboard,
    HorizontalLines,
    VerticalLines,
}

/// A detected dithered area between two tokens.
#[derive(Debug, Clone, Serialize)]
pub struct DitherInfo {
    pub tokens: Vec<String>,
    pub pattern: DitherPattern,
    /// Bounding box as `[x, y, width, height]`.
    pub bounds: [u32; 4],
    /// Average of the two participating colors, lowercase hex.
    pub merged_color: String,
    pub confidence: f64,
}

/// Detected nearest-neighbor upscaling.
#[derive(Debug, Clone, Serialize)]
pub struct UpscaleInfo {
    pub scale: u32,
    pub native_size: [u32; 2],
    pub confidence: f64,
}

/// A token that traces other regions as a dark stroke.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineInfo {
    pub token: String,
    pub borders: Vec<String>,
    pub width: f64,
    pub confidence: f64,
}

/// A suggested readable name for a generated token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamingHint {
    pub token: String,
    pub suggested_name: String,
    pub reason: String,
}

/// Structural analysis attached to an analyzed import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub roles: HashMap<String, Role>,
    pub relationships: Vec<Relationship>,
    pub symmetry: Option<Symmetry>,
    pub naming_hints: Vec<NamingHint>,
    pub z_order: HashMap<String, i64>,
    pub dither_patterns: Vec<DitherInfo>,
    pub upscale_info: Option<UpscaleInfo>,
    pub outlines: Vec<OutlineInfo>,
}

/// Import tuning knobs.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Sprite name; defaults to the file stem.
    pub name: Option<String>,
    /// Palette size bound, transparency included.
    pub max_colors: usize,
    /// Minimum confidence for reported inferences.
    pub confidence_threshold: f64,
    /// Generate token naming hints.
    pub hints: bool,
    /// Look for nearest-neighbor upscaling.
    pub detect_upscale: bool,
    /// Look for dark stroke regions.
    pub detect_outlines: bool,
    pub dither_handling: DitherHandling,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            name: None,
            max_colors: 16,
            confidence_threshold: 0.5,
            hints: true,
            detect_upscale: true,
            detect_outlines: true,
            dither_handling: DitherHandling::Keep,
        }
    }
}

/// Result of importing one raster.
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Token to hex color, most frequent token first.
    pub palette: IndexMap<String, String>,
    /// Reconstructed regions keyed by token (`token_2`... for extra
    /// connected components).
    pub regions: IndexMap<String, RegionDef>,
    pub analysis: Option<AnalysisReport>,
}

impl ImportResult {
    fn palette_name(&self) -> String {
        format!("{}_palette", self.name)
    }

    /// One-object-per-line serialization: a palette line then a sprite line.
    pub fn to_pxl_lines(&self) -> String {
        let palette = PxlObject::Palette(Palette {
            name: self.palette_name(),
            colors: self.palette.clone(),
        });
        let sprite = PxlObject::Sprite(Sprite {
            name: self.name.clone(),
            size: Some([self.width, self.height]),
            palette: PaletteRef::Named(self.palette_name()),
            regions: self.regions.clone(),
        });
        format!("{}\n{}", json_line(&palette), json_line(&sprite))
    }

    /// Multi-object canonical serialization.
    pub fn to_pxl(&self) -> String {
        let lines = self.to_pxl_lines();
        match format_pxl(&lines) {
            Ok(formatted) => formatted,
            Err(e) => {
                debug_assert!(false, "emitted lines did not format: {e}");
                lines
            }
        }
    }
}

fn json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Import a PNG without deep analysis.
pub fn import_image<P: AsRef<Path>>(
    path: P,
    name: Option<&str>,
    max_colors: usize,
) -> Result<ImportResult, ImportError> {
    let options = ImportOptions {
        name: name.map(str::to_string),
        max_colors,
        ..ImportOptions::default()
    };
    import_inner(path.as_ref(), &options, false)
}

/// Import a PNG and attach a full [`AnalysisReport`].
pub fn import_image_analyzed<P: AsRef<Path>>(
    path: P,
    options: &ImportOptions,
) -> Result<ImportResult, ImportError> {
    import_inner(path.as_ref(), options, true)
}

fn import_inner(
    path: &Path,
    options: &ImportOptions,
    analyzed: bool,
) -> Result<ImportResult, ImportError> {
    let name = match &options.name {
        Some(name) => name.clone(),
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("imported")
            .to_string(),
    };

    let decoded = decode_png_file(path)?;
    let (width, height) = (decoded.width, decoded.height);

    let stats = census(&decoded.pixels);
    let (survivors, remap) = quantize(&stats, options.max_colors.max(1));

    // Tokens in descending frequency, first-seen order on ties.
    let mut palette: IndexMap<String, String> = IndexMap::new();
    let mut token_of: HashMap<Color, String> = HashMap::new();
    let mut opaque_count = 0usize;
    for color in token_order(&survivors) {
        let token = if color.is_transparent() {
            TRANSPARENT_TOKEN.to_string()
        } else {
            opaque_count += 1;
            format!("c{}", opaque_count)
        };
        palette.insert(token.clone(), color.to_hex());
        token_of.insert(color, token);
    }

    let mut token_pixels: HashMap<String, HashSet<(i32, i32)>> = HashMap::new();
    let mut token_colors: HashMap<String, [u8; 4]> = HashMap::new();
    for (token, color) in token_of.iter().map(|(c, t)| (t, c)) {
        token_colors.insert(token.clone(), color.to_rgba());
        token_pixels.entry(token.clone()).or_default();
    }
    for (index, chunk) in decoded.pixels.chunks_exact(4).enumerate() {
        let mut sampled = Color::from_rgba([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if sampled.is_transparent() {
            sampled = Color::from_rgba([0, 0, 0, 0]);
        }
        let survivor = remap.get(&sampled).copied().unwrap_or(sampled);
        if let Some(token) = token_of.get(&survivor) {
            let x = (index as u32 % width.max(1)) as i32;
            let y = (index as u32 / width.max(1)) as i32;
            token_pixels.entry(token.clone()).or_default().insert((x, y));
        }
    }

    let mut dither_patterns = Vec::new();
    if options.dither_handling != DitherHandling::Keep {
        dither_patterns = detect_dither_patterns(&token_pixels, &token_colors);
        dither_patterns.retain(|p| p.confidence >= options.confidence_threshold);
    }
    if options.dither_handling == DitherHandling::Merge {
        fold_dithered_tokens(
            &dither_patterns,
            &mut token_pixels,
            &mut token_colors,
            &mut palette,
        );
    }

    let analysis = if analyzed {
        Some(run_analysis(
            width,
            height,
            &token_pixels,
            &token_colors,
            dither_patterns,
            options,
        ))
    } else {
        None
    };

    let z_order = analysis.as_ref().map(|a| &a.z_order);
    let regions = extract_regions(&palette, &token_pixels, width, height, z_order);

    Ok(ImportResult { name, width, height, palette, regions, analysis })
}

/// Merge each detected dither pair into its dominant token, recolored to the
/// pattern's averaged color.
fn fold_dithered_tokens(
    patterns: &[DitherInfo],
    token_pixels: &mut HashMap<String, HashSet<(i32, i32)>>,
    token_colors: &mut HashMap<String, [u8; 4]>,
    palette: &mut IndexMap<String, String>,
) {
    for pattern in patterns {
        let [first, second] = match pattern.tokens.as_slice() {
            [a, b] => [a.clone(), b.clone()],
            _ => continue,
        };
        if !token_pixels.contains_key(&first) || !token_pixels.contains_key(&second) {
            continue;
        }

        let (dominant, victim) =
            if token_pixels[&first].len() >= token_pixels[&second].len() {
                (first, second)
            } else {
                (second, first)
            };

        let moved = token_pixels.remove(&victim).unwrap_or_default();
        if let Some(target) = token_pixels.get_mut(&dominant) {
            target.extend(moved);
        }

        let victim_color = token_colors.remove(&victim).unwrap_or([0, 0, 0, 255]);
        if let Some(color) = token_colors.get_mut(&dominant) {
            *color = average_colors(&[*color, victim_color]);
            palette.insert(dominant.clone(), pattern.merged_color.clone());
        }
        palette.shift_remove(&victim);
    }
}

fn run_analysis(
    width: u32,
    height: u32,
    token_pixels: &HashMap<String, HashSet<(i32, i32)>>,
    token_colors: &HashMap<String, [u8; 4]>,
    dither_patterns: Vec<DitherInfo>,
    options: &ImportOptions,
) -> AnalysisReport {
    let mut report = AnalysisReport { dither_patterns, ..AnalysisReport::default() };

    // Rebuild the quantized raster so symmetry and upscale reflect the
    // palette the sprite will actually carry.
    let mut raster = vec![0u8; (width * height * 4) as usize];
    for (token, pixels) in token_pixels {
        if let Some(color) = token_colors.get(token) {
            for &(x, y) in pixels {
                let idx = ((y as u32 * width + x as u32) * 4) as usize;
                if idx + 3 < raster.len() {
                    raster[idx..idx + 4].copy_from_slice(color);
                }
            }
        }
    }
    report.symmetry = detect_symmetry(&raster, width, height);

    let role_input: HashMap<String, (HashSet<(i32, i32)>, Option<[u8; 4]>)> = token_pixels
        .iter()
        .map(|(token, pixels)| {
            (token.clone(), (pixels.clone(), token_colors.get(token).copied()))
        })
        .collect();
    for (token, inference) in infer_roles_batch(&role_input, width, height) {
        if inference.confidence >= options.confidence_threshold {
            report.roles.insert(token, inference.role);
        }
    }

    let mut region_data: Vec<RegionData> = token_pixels
        .iter()
        .map(|(token, pixels)| RegionData {
            name: token.clone(),
            pixels: pixels.clone(),
            color: token_colors.get(token).copied().unwrap_or([0, 0, 0, 255]),
        })
        .collect();
    region_data.sort_by(|a, b| a.name.cmp(&b.name));
    report.relationships = infer_relationships_batch(&region_data, width)
        .into_iter()
        .filter(|rel| rel.confidence >= options.confidence_threshold)
        .collect();

    let tokens: Vec<String> = token_pixels.keys().cloned().collect();
    let rel_tuples: Vec<(String, crate::analyze::RelationshipType, String)> = report
        .relationships
        .iter()
        .map(|rel| (rel.source.clone(), rel.relationship, rel.target.clone()))
        .collect();
    report.z_order = infer_z_order(&tokens, &rel_tuples);

    if options.detect_upscale {
        report.upscale_info = detect_upscale(&raster, width, height)
            .filter(|info| info.confidence >= options.confidence_threshold);
    }
    if options.detect_outlines {
        let mut outlines = detect_outlines(token_pixels, token_colors);
        outlines.retain(|o| o.confidence >= options.confidence_threshold);
        report.outlines = outlines;
    }
    if options.hints {
        report.naming_hints =
            generate_naming_hints(&report.roles, token_pixels, token_colors, width, height);
    }

    report
}

/// Rebuild region geometry: one entry per 4-connected component, rectangles
/// for solid blocks, scan-ordered point lists otherwise.
fn extract_regions(
    palette: &IndexMap<String, String>,
    token_pixels: &HashMap<String, HashSet<(i32, i32)>>,
    width: u32,
    height: u32,
    z_order: Option<&HashMap<String, i64>>,
) -> IndexMap<String, RegionDef> {
    let mut regions = IndexMap::new();
    for token in palette.keys() {
        let pixels = match token_pixels.get(token) {
            Some(pixels) if !pixels.is_empty() => pixels,
            _ => continue,
        };
        let z = z_order
            .and_then(|map| map.get(token).copied())
            .filter(|&z| z != 0);

        for (i, component) in connected_components(pixels, width, height).iter().enumerate() {
            let key = if i == 0 { token.clone() } else { format!("{}_{}", token, i + 1) };
            let component_set: HashSet<(i32, i32)> = component.iter().copied().collect();
            let def = match solid_rect(&component_set) {
                Some(rect) => RegionDef { rect: Some(rect), z, ..Default::default() },
                None => RegionDef {
                    points: Some(
                        component.iter().map(|&(x, y)| [x as i64, y as i64]).collect(),
                    ),
                    z,
                    ..Default::default()
                },
            };
            regions.insert(key, def);
        }
    }
    regions
}

/// Maximal 4-connected components, discovered and listed in scan order.
fn connected_components(
    pixels: &HashSet<(i32, i32)>,
    width: u32,
    height: u32,
) -> Vec<Vec<(i32, i32)>> {
    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let mut components = Vec::new();

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if !pixels.contains(&(x, y)) || visited.contains(&(x, y)) {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![(x, y)];
            visited.insert((x, y));
            while let Some((cx, cy)) = stack.pop() {
                component.push((cx, cy));
                for neighbor in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
                    if pixels.contains(&neighbor) && visited.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
            component.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
            components.push(component);
        }
    }
    components
}
