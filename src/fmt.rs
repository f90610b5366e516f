//! Canonical formatter for PXL text.
//!
//! Parses the input and re-serializes every object in the canonical style:
//! two-space indentation, quoted keys, a fixed key order per object type,
//! inline arrays with single-space separation, and one blank line between
//! top-level objects. Map entry order (palette colors, sprite regions) is
//! preserved - region order is a render-visible tie-break.
//!
//! Formatting is idempotent, maps empty input to empty output, and rejects
//! input that does not parse.

use thiserror::Error;

use crate::models::{Animation, Palette, PaletteRef, PxlObject, RegionDef, Sprite, Variant};
use crate::parser::{parse_line, split_literals};

/// Error rejecting unformattable input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("cannot format unparseable input: line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Re-serialize PXL text canonically.
pub fn format_pxl(input: &str) -> Result<String, FormatError> {
    let literals = split_literals(input);
    if literals.is_empty() {
        return Ok(String::new());
    }

    let mut objects = Vec::with_capacity(literals.len());
    for literal in literals {
        let object = parse_line(&literal.text, literal.line)
            .map_err(|e| FormatError::Parse { line: e.line, message: e.message })?;
        objects.push(object);
    }

    let rendered: Vec<String> = objects.iter().map(write_object).collect();
    Ok(format!("{}\n", rendered.join("\n\n")))
}

fn write_object(object: &PxlObject) -> String {
    match object {
        PxlObject::Palette(p) => write_palette(p),
        PxlObject::Sprite(s) => write_sprite(s),
        PxlObject::Variant(v) => write_variant(v),
        PxlObject::Animation(a) => write_animation(a),
    }
}

fn write_palette(palette: &Palette) -> String {
    let mut out = String::from("{\n");
    out.push_str("  \"type\": \"palette\",\n");
    out.push_str(&format!("  \"name\": {},\n", quote(&palette.name)));
    out.push_str(&format!("  \"colors\": {}\n", write_color_map(&palette.colors, 1)));
    out.push('}');
    out
}

fn write_sprite(sprite: &Sprite) -> String {
    let mut out = String::from("{\n");
    out.push_str("  \"type\": \"sprite\",\n");
    out.push_str(&format!("  \"name\": {},\n", quote(&sprite.name)));
    if let Some([w, h]) = sprite.size {
        out.push_str(&format!("  \"size\": [{}, {}],\n", w, h));
    }
    match &sprite.palette {
        PaletteRef::Named(name) => {
            out.push_str(&format!("  \"palette\": {},\n", quote(name)));
        }
        PaletteRef::Inline(colors) => {
            out.push_str(&format!("  \"palette\": {},\n", write_color_map(colors, 1)));
        }
    }
    if sprite.regions.is_empty() {
        out.push_str("  \"regions\": {}\n");
    } else {
        out.push_str("  \"regions\": {\n");
        let entries: Vec<String> = sprite
            .regions
            .iter()
            .map(|(token, region)| format!("    {}: {}", quote(token), write_region(region)))
            .collect();
        out.push_str(&entries.join(",\n"));
        out.push_str("\n  }\n");
    }
    out.push('}');
    out
}

fn write_region(region: &RegionDef) -> String {
    let mut fields = Vec::new();
    if let Some(points) = &region.points {
        let rendered: Vec<String> =
            points.iter().map(|p| format!("[{}, {}]", p[0], p[1])).collect();
        fields.push(format!("\"points\": [{}]", rendered.join(", ")));
    }
    if let Some([x, y, w, h]) = region.rect {
        fields.push(format!("\"rect\": [{}, {}, {}, {}]", x, y, w, h));
    }
    if let Some(z) = region.z {
        fields.push(format!("\"z\": {}", z));
    }
    if fields.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{\n");
    let indented: Vec<String> = fields.iter().map(|f| format!("      {}", f)).collect();
    out.push_str(&indented.join(",\n"));
    out.push_str("\n    }");
    out
}

fn write_variant(variant: &Variant) -> String {
    let mut out = String::from("{\n");
    out.push_str("  \"type\": \"variant\",\n");
    out.push_str(&format!("  \"name\": {},\n", quote(&variant.name)));
    out.push_str(&format!("  \"base\": {},\n", quote(&variant.base)));
    out.push_str(&format!("  \"palette\": {}\n", write_color_map(&variant.palette, 1)));
    out.push('}');
    out
}

fn write_animation(animation: &Animation) -> String {
    let mut out = String::from("{\n");
    out.push_str("  \"type\": \"animation\",\n");
    out.push_str(&format!("  \"name\": {}", quote(&animation.name)));
    out.push_str(",\n");
    let frames: Vec<String> = animation.frames.iter().map(|f| quote(f)).collect();
    out.push_str(&format!("  \"frames\": [{}]", frames.join(", ")));
    if let Some(duration) = animation.duration {
        out.push_str(",\n");
        out.push_str(&format!("  \"duration\": {}", write_number(duration)));
    }
    out.push_str("\n}");
    out
}

fn write_color_map(colors: &indexmap::IndexMap<String, String>, depth: usize) -> String {
    if colors.is_empty() {
        return "{}".to_string();
    }
    let indent = "  ".repeat(depth);
    let inner = "  ".repeat(depth + 1);
    let entries: Vec<String> = colors
        .iter()
        .map(|(token, color)| format!("{}{}: {}", inner, quote(token), quote(color)))
        .collect();
    format!("{{\n{}\n{}}}", entries.join(",\n"), indent)
}

/// Print a number without a trailing `.0` so formatting stays idempotent.
fn write_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn empty_input_maps_to_empty_output() {
        assert_eq!(format_pxl("").unwrap(), "");
        assert_eq!(format_pxl("  \n\n").unwrap(), "");
    }

    #[test]
    fn unparseable_input_is_rejected() {
        let err = format_pxl("{broken").unwrap_err();
        assert!(matches!(err, FormatError::Parse { line: 1, .. }));
    }

    #[test]
    fn canonical_palette_layout() {
        let out = format_pxl(r##"{type: "palette", name: "p", colors: {x: "#ff0000"}}"##).unwrap();
        let expected = "{\n  \"type\": \"palette\",\n  \"name\": \"p\",\n  \"colors\": {\n    \"x\": \"#ff0000\"\n  }\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn formatting_is_idempotent() {
        let input = concat!(
            r##"{type: "palette", name: "p", colors: {x: "#ff0000", y: "#00ff00"}}"##,
            "\n",
            r##"{type: "sprite", name: "s", size: [2, 1], palette: "p",
                 regions: {x: {points: [[0, 0]], z: 1}, y: {rect: [1, 0, 1, 1]}}}"##,
            "\n",
            r##"{type: "variant", name: "v", base: "s", palette: {x: "#123456"}}"##,
            "\n",
            r##"{type: "animation", name: "a", frames: ["s"], duration: 100}"##,
        );
        let once = format_pxl(input).unwrap();
        let twice = format_pxl(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn structural_round_trip() {
        let input = concat!(
            r##"{type: "palette", name: "p", colors: {x: "#ff0000"}}"##,
            "\n",
            r##"{type: "sprite", name: "s", size: [1, 1], palette: "p", regions: {x: {points: [[0, 0]]}}}"##,
        );
        let original = parse(input);
        let formatted = format_pxl(input).unwrap();
        let reparsed = parse(&formatted);
        assert!(reparsed.warnings.is_empty());
        assert_eq!(original.objects, reparsed.objects);
    }

    #[test]
    fn objects_are_separated_by_a_blank_line() {
        let input = concat!(
            r##"{type: "palette", name: "a", colors: {}}"##,
            "\n",
            r##"{type: "palette", name: "b", colors: {}}"##,
        );
        let out = format_pxl(input).unwrap();
        assert!(out.contains("}\n\n{"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn region_order_is_preserved() {
        let input = r##"{type: "sprite", name: "s", size: [1, 1], palette: {},
            regions: {zz: {points: [[0, 0]]}, aa: {points: [[0, 0]]}}}"##;
        let out = format_pxl(input).unwrap();
        let zz = out.find("\"zz\"").unwrap();
        let aa = out.find("\"aa\"").unwrap();
        assert!(zz < aa);
    }

    #[test]
    fn duration_has_no_trailing_point_zero() {
        let out =
            format_pxl(r#"{type: "animation", name: "a", frames: [], duration: 100}"#).unwrap();
        assert!(out.contains("\"duration\": 100\n"));
        assert!(!out.contains("100.0"));
    }
}
