//! Registries for named objects and the stateful corpus facade.

mod palette;
mod sprite;

pub use palette::{
    LenientResult, PaletteRegistry, PaletteSource, PaletteWarning, ResolvedPalette,
    MAGENTA_FALLBACK,
};
pub use sprite::{ResolvedSprite, SpriteError, SpriteRegistry};

use std::collections::BTreeMap;
use std::path::Path;

use crate::codec::{self, CodecError};
use crate::models::{PxlObject, Warning};
use crate::parser;
use crate::renderer::{render_resolved, PngRender, RenderOutput};

/// Stateful accumulator over repeated loads.
///
/// Later loads merge into the accumulated state; an object with an already
/// known name replaces the earlier one, everything else is kept. Not safe
/// for unsynchronized concurrent mutation - one instance per execution
/// context.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    palettes: PaletteRegistry,
    sprites: SpriteRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `input` and merge its objects into the accumulated state.
    /// Returns parse warnings; malformed literals never abort the load.
    pub fn load(&mut self, input: &str) -> Vec<Warning> {
        let parsed = parser::parse(input);
        for object in parsed.objects {
            match object {
                PxlObject::Palette(p) => self.palettes.register(p),
                PxlObject::Sprite(s) => self.sprites.register_sprite(s),
                PxlObject::Variant(v) => self.sprites.register_variant(v),
                // animations reference sprites by name; nothing to index yet
                PxlObject::Animation(_) => {}
            }
        }
        parsed.warnings
    }

    /// Read a file and [`load`](Self::load) its contents.
    pub fn load_file(&mut self, path: &Path) -> std::io::Result<Vec<Warning>> {
        let input = std::fs::read_to_string(path)?;
        Ok(self.load(&input))
    }

    /// Renderable names (sprites and variants) in lexical order.
    pub fn sprites(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sprites.names().cloned().collect();
        names.sort();
        names
    }

    /// Palette names in lexical order.
    pub fn palettes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.palettes.names().cloned().collect();
        names.sort();
        names
    }

    /// Render one sprite or variant by name.
    ///
    /// An unknown name yields an empty-but-valid 0x0 result with a warning
    /// rather than an error.
    pub fn render(&self, name: &str) -> RenderOutput {
        match self.sprites.resolve(name, &self.palettes) {
            Ok(resolved) => {
                let (image, warnings) = render_resolved(&resolved);
                RenderOutput {
                    width: image.width(),
                    height: image.height(),
                    pixels: image.into_raw(),
                    warnings,
                }
            }
            Err(e) => RenderOutput::empty(vec![e.to_string()]),
        }
    }

    /// Render one sprite or variant by name to PNG bytes.
    pub fn render_to_png(&self, name: &str) -> Result<PngRender, CodecError> {
        let output = self.render(name);
        if output.width == 0 || output.height == 0 {
            return Ok(PngRender { bytes: Vec::new(), warnings: output.warnings });
        }
        let bytes = codec::encode_png(&output.pixels, output.width, output.height)?;
        Ok(PngRender { bytes, warnings: output.warnings })
    }

    /// Render every known sprite and variant to PNG bytes, keyed by name.
    /// An empty registry yields an empty map.
    pub fn render_all(&self) -> Result<BTreeMap<String, Vec<u8>>, CodecError> {
        let mut rendered = BTreeMap::new();
        for name in self.sprites() {
            let png = self.render_to_png(&name)?;
            rendered.insert(name, png.bytes);
        }
        Ok(rendered)
    }
}
