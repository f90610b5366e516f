//! Palette registry and palette resolution.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::models::{Palette, PaletteRef, Sprite};

/// Fallback color painted for tokens that cannot be resolved.
pub const MAGENTA_FALLBACK: &str = "#ff00ff";

/// A palette ready for rendering: token -> color literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPalette {
    pub colors: IndexMap<String, String>,
    pub source: PaletteSource,
}

/// Where a resolved palette came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteSource {
    /// A named palette found in the registry
    Named(String),
    /// An inline palette carried by the sprite itself
    Inline,
    /// Empty fallback for a missing named palette
    Fallback,
}

/// Non-fatal problem found while resolving a palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteWarning {
    pub message: String,
}

impl PaletteWarning {
    pub fn not_found(name: &str) -> Self {
        Self { message: format!("Palette '{}' not found", name) }
    }
}

/// Resolution always succeeds; a missing palette becomes a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct LenientResult {
    pub palette: ResolvedPalette,
    pub warning: Option<PaletteWarning>,
}

/// Accumulating store of named palettes.
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    palettes: HashMap<String, Palette>,
}

impl PaletteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a palette; a later palette with the same name replaces it.
    pub fn register(&mut self, palette: Palette) {
        self.palettes.insert(palette.name.clone(), palette);
    }

    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.palettes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.palettes.keys()
    }

    /// Resolve a sprite's palette reference.
    ///
    /// A named palette that is not registered resolves to an empty fallback
    /// (its tokens will render magenta) with a warning.
    pub fn resolve(&self, sprite: &Sprite) -> LenientResult {
        match &sprite.palette {
            PaletteRef::Named(name) => {
                if let Some(palette) = self.palettes.get(name) {
                    LenientResult {
                        palette: ResolvedPalette {
                            colors: palette.colors.clone(),
                            source: PaletteSource::Named(name.clone()),
                        },
                        warning: None,
                    }
                } else {
                    LenientResult {
                        palette: ResolvedPalette {
                            colors: IndexMap::new(),
                            source: PaletteSource::Fallback,
                        },
                        warning: Some(PaletteWarning::not_found(name)),
                    }
                }
            }
            PaletteRef::Inline(colors) => LenientResult {
                palette: ResolvedPalette {
                    colors: colors.clone(),
                    source: PaletteSource::Inline,
                },
                warning: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(name: &str) -> Palette {
        let mut colors = IndexMap::new();
        colors.insert("x".to_string(), "#ff0000".to_string());
        Palette { name: name.to_string(), colors }
    }

    fn sprite_with(palette: PaletteRef) -> Sprite {
        Sprite {
            name: "s".to_string(),
            size: Some([1, 1]),
            palette,
            regions: IndexMap::new(),
        }
    }

    #[test]
    fn named_palette_resolves() {
        let mut registry = PaletteRegistry::new();
        registry.register(palette("p"));
        let result = registry.resolve(&sprite_with(PaletteRef::Named("p".to_string())));
        assert_eq!(result.palette.source, PaletteSource::Named("p".to_string()));
        assert!(result.warning.is_none());
        assert_eq!(result.palette.colors.get("x").map(String::as_str), Some("#ff0000"));
    }

    #[test]
    fn missing_palette_falls_back_with_warning() {
        let registry = PaletteRegistry::new();
        let result = registry.resolve(&sprite_with(PaletteRef::Named("ghost".to_string())));
        assert_eq!(result.palette.source, PaletteSource::Fallback);
        assert!(result.palette.colors.is_empty());
        assert_eq!(result.warning.unwrap().message, "Palette 'ghost' not found");
    }

    #[test]
    fn same_name_replaces() {
        let mut registry = PaletteRegistry::new();
        registry.register(palette("p"));
        let mut newer = palette("p");
        newer.colors.insert("y".to_string(), "#00ff00".to_string());
        registry.register(newer);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("p").unwrap().colors.len(), 2);
    }
}
