//! Variant type: a palette-only recolor of a base sprite.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A recolor of `base`: geometry is inherited, listed tokens are remapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub base: String,
    #[serde(default)]
    pub palette: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_override_map() {
        let v: Variant = json5::from_str(
            r##"{name: "hero_red", base: "hero", palette: {cape: "#aa0000"}}"##,
        )
        .unwrap();
        assert_eq!(v.base, "hero");
        assert_eq!(v.palette.get("cape").map(String::as_str), Some("#aa0000"));
    }
}
