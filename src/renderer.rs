//! Rasterizing renderer: resolved sprites to RGBA buffers and PNG bytes.
//!
//! Every pixel starts fully transparent. Regions paint in ascending z,
//! ties broken by declaration order (stable sort); later paints overwrite
//! earlier ones. Tokens that cannot be resolved to a color paint the
//! magenta fallback and emit a warning rather than failing the render.

use image::{Rgba, RgbaImage};

use crate::codec::{self, CodecError};
use crate::color::parse_rgba;
use crate::models::PxlObject;
use crate::parser;
use crate::registry::{PaletteRegistry, ResolvedSprite, SpriteRegistry, MAGENTA_FALLBACK};

/// Raw RGBA render result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major RGBA
    pub pixels: Vec<u8>,
    pub warnings: Vec<String>,
}

impl RenderOutput {
    /// A 0x0 result carrying only warnings.
    pub fn empty(warnings: Vec<String>) -> Self {
        Self { width: 0, height: 0, pixels: Vec::new(), warnings }
    }
}

/// PNG render result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngRender {
    pub bytes: Vec<u8>,
    pub warnings: Vec<String>,
}

/// Rasterize a resolved sprite.
///
/// A sprite with zero resolvable regions still yields a correctly sized,
/// fully transparent buffer.
pub fn render_resolved(sprite: &ResolvedSprite) -> (RgbaImage, Vec<String>) {
    let mut image = RgbaImage::from_pixel(sprite.width, sprite.height, Rgba([0, 0, 0, 0]));
    let mut warnings = sprite.warnings.clone();

    let magenta = Rgba([255, 0, 255, 255]);
    let mut ordered: Vec<(&String, &crate::models::RegionDef)> = sprite.regions.iter().collect();
    ordered.sort_by_key(|(_, region)| region.z_order());

    for (token, region) in ordered {
        let color = match sprite.colors.get(token) {
            Some(literal) => match parse_rgba(literal) {
                Ok(rgba) => rgba,
                Err(e) => {
                    warnings.push(format!(
                        "Invalid color \"{}\" for token {}: {} (using {})",
                        literal, token, e, MAGENTA_FALLBACK
                    ));
                    magenta
                }
            },
            None => {
                warnings.push(format!("Undefined token {} (using {})", token, MAGENTA_FALLBACK));
                magenta
            }
        };

        for (x, y) in region.coordinates() {
            if x >= 0 && y >= 0 && (x as u32) < sprite.width && (y as u32) < sprite.height {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    (image, warnings)
}

/// Render the first sprite in a PXL text to raw RGBA.
///
/// Parse warnings and render warnings are both reported. When the input
/// contains no sprites the result is 0x0 with a "No sprites found" warning.
pub fn render_to_rgba(input: &str) -> RenderOutput {
    let (palettes, sprites, order, mut warnings) = prepare(input);

    let Some(first) = order.first() else {
        warnings.push("No sprites found in input".to_string());
        return RenderOutput::empty(warnings);
    };

    match sprites.resolve(first, &palettes) {
        Ok(resolved) => {
            let (image, render_warnings) = render_resolved(&resolved);
            warnings.extend(render_warnings);
            RenderOutput {
                width: image.width(),
                height: image.height(),
                pixels: image.into_raw(),
                warnings,
            }
        }
        Err(e) => {
            warnings.push(e.to_string());
            RenderOutput::empty(warnings)
        }
    }
}

/// Render the first sprite in a PXL text to PNG bytes.
///
/// With no sprites in the input the byte buffer is empty (not a malformed
/// PNG) and the warning says so.
pub fn render_to_png(input: &str) -> Result<PngRender, CodecError> {
    let output = render_to_rgba(input);
    if output.width == 0 || output.height == 0 {
        return Ok(PngRender { bytes: Vec::new(), warnings: output.warnings });
    }
    let bytes = codec::encode_png(&output.pixels, output.width, output.height)?;
    Ok(PngRender { bytes, warnings: output.warnings })
}

/// Parse input and stage it into registries, keeping sprite declaration
/// order so "first sprite" is well defined.
fn prepare(input: &str) -> (PaletteRegistry, SpriteRegistry, Vec<String>, Vec<String>) {
    let parsed = parser::parse(input);
    let warnings: Vec<String> =
        parsed.warnings.iter().map(|w| format!("line {}: {}", w.line, w.message)).collect();

    let mut palettes = PaletteRegistry::new();
    let mut sprites = SpriteRegistry::new();
    let mut order = Vec::new();

    for object in parsed.objects {
        match object {
            PxlObject::Palette(p) => palettes.register(p),
            PxlObject::Sprite(s) => {
                order.push(s.name.clone());
                sprites.register_sprite(s);
            }
            PxlObject::Variant(v) => sprites.register_variant(v),
            PxlObject::Animation(_) => {}
        }
    }

    (palettes, sprites, order, warnings)
}
