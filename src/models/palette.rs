//! Palette and palette-reference types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named mapping from tokens to color literals.
///
/// Entry order is preserved as written; it matters to the formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    #[serde(default)]
    pub colors: IndexMap<String, String>,
}

/// A sprite's palette: either the name of a stored palette or an inline map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteRef {
    Named(String),
    Inline(IndexMap<String, String>),
}

impl Default for PaletteRef {
    fn default() -> Self {
        PaletteRef::Inline(IndexMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_ref_named() {
        let r: PaletteRef = json5::from_str(r#""forest""#).unwrap();
        assert_eq!(r, PaletteRef::Named("forest".to_string()));
    }

    #[test]
    fn palette_ref_inline_keeps_order() {
        let r: PaletteRef = json5::from_str(r##"{b: "#0000ff", a: "#ff0000"}"##).unwrap();
        match r {
            PaletteRef::Inline(map) => {
                let keys: Vec<_> = map.keys().cloned().collect();
                assert_eq!(keys, vec!["b", "a"]);
            }
            PaletteRef::Named(_) => panic!("expected inline palette"),
        }
    }
}
