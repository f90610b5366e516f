//! Top-level PXL object types.

use serde::{Deserialize, Serialize};

use super::{Animation, Palette, Sprite, Variant};

/// Any top-level object in a PXL stream, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PxlObject {
    Palette(Palette),
    Sprite(Sprite),
    Variant(Variant),
    Animation(Animation),
}

impl PxlObject {
    /// The object's declared name.
    pub fn name(&self) -> &str {
        match self {
            PxlObject::Palette(p) => &p.name,
            PxlObject::Sprite(s) => &s.name,
            PxlObject::Variant(v) => &v.name,
            PxlObject::Animation(a) => &a.name,
        }
    }

    /// The `type` discriminator as it appears in source text.
    pub fn type_name(&self) -> &'static str {
        match self {
            PxlObject::Palette(_) => "palette",
            PxlObject::Sprite(_) => "sprite",
            PxlObject::Variant(_) => "variant",
            PxlObject::Animation(_) => "animation",
        }
    }
}

/// A recoverable problem tied to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Human-readable description
    pub message: String,
    /// 1-based line where the problem starts
    pub line: usize,
}

impl Warning {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self { message: message.into(), line }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_palette() {
        let obj: PxlObject =
            json5::from_str(r##"{type: "palette", name: "p", colors: {x: "#ff0000"}}"##).unwrap();
        assert!(matches!(obj, PxlObject::Palette(_)));
        assert_eq!(obj.name(), "p");
        assert_eq!(obj.type_name(), "palette");
    }

    #[test]
    fn rejects_unknown_type() {
        let result: Result<PxlObject, _> = json5::from_str(r#"{type: "widget", name: "w"}"#);
        assert!(result.is_err());
    }
}
