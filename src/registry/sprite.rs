//! Sprite/variant registry and sprite resolution.

use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;

use crate::models::{RegionDef, Sprite, Variant};

use super::palette::PaletteRegistry;

/// Error resolving a renderable name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteError {
    #[error("Sprite '{0}' not found")]
    NotFound(String),
    #[error("Variant cycle detected involving '{0}'")]
    Cycle(String),
}

/// A sprite with its palette resolved, ready for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSprite {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// token -> color literal
    pub colors: IndexMap<String, String>,
    /// regions in declaration order (the z tie-break)
    pub regions: IndexMap<String, RegionDef>,
    pub warnings: Vec<String>,
}

/// Accumulating store of sprites and variants.
#[derive(Debug, Clone, Default)]
pub struct SpriteRegistry {
    sprites: HashMap<String, Sprite>,
    variants: HashMap<String, Variant>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_sprite(&mut self, sprite: Sprite) {
        self.sprites.insert(sprite.name.clone(), sprite);
    }

    pub fn register_variant(&mut self, variant: Variant) {
        self.variants.insert(variant.name.clone(), variant);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sprites.contains_key(name) || self.variants.contains_key(name)
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// All renderable names: sprites and variants.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.sprites.keys().chain(self.variants.keys())
    }

    /// Resolve a sprite or variant by name.
    ///
    /// Variants inherit the base sprite's geometry and remap listed tokens;
    /// chains of variants are followed with cycle detection.
    pub fn resolve(
        &self,
        name: &str,
        palettes: &PaletteRegistry,
    ) -> Result<ResolvedSprite, SpriteError> {
        // overrides collected innermost-first along the variant chain
        let mut overrides: Vec<&IndexMap<String, String>> = Vec::new();
        let mut visited: Vec<&str> = Vec::new();
        let mut current = name;

        let sprite = loop {
            if let Some(sprite) = self.sprites.get(current) {
                break sprite;
            }
            let Some(variant) = self.variants.get(current) else {
                return Err(SpriteError::NotFound(name.to_string()));
            };
            if visited.contains(&current) {
                return Err(SpriteError::Cycle(current.to_string()));
            }
            visited.push(current);
            overrides.push(&variant.palette);
            current = &variant.base;
        };

        let resolved = palettes.resolve(sprite);
        let mut warnings = Vec::new();
        if let Some(w) = resolved.warning {
            warnings.push(w.message);
        }

        let mut colors = resolved.palette.colors;
        // apply outermost overrides last so the requested variant wins
        for remap in overrides.iter().rev() {
            for (token, color) in remap.iter() {
                colors.insert(token.clone(), color.clone());
            }
        }

        let (width, height) = sprite.dimensions();
        Ok(ResolvedSprite {
            name: name.to_string(),
            width,
            height,
            colors,
            regions: sprite.regions.clone(),
            warnings,
        })
    }
}
