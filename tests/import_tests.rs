//! Render/import round-trip tests: a rendered sprite encoded to PNG and
//! imported back must reproduce its geometry, and without a color bound its
//! exact pixels.

use pxl::import::{import_image, import_image_analyzed, DitherHandling, ImportOptions};
use pxl::{format_pxl, render_to_png, render_to_rgba};

const CHECKER: &str = concat!(
    r##"{type: "palette", name: "p", colors: {a: "#ff0000", b: "#0000ff"}}"##,
    "\n",
    r##"{type: "sprite", name: "checker", size: [2, 2], palette: "p","##,
    r##" regions: {a: {points: [[0, 0], [1, 1]]}, b: {points: [[1, 0], [0, 1]]}}}"##,
);

fn write_render(input: &str) -> tempfile::NamedTempFile {
    let render = render_to_png(input).expect("render");
    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), &render.bytes).expect("write png");
    file
}

#[test]
fn import_preserves_dimensions() {
    let file = write_render(CHECKER);
    let result = import_image(file.path(), Some("checker"), 16).expect("import");
    assert_eq!((result.width, result.height), (2, 2));
    assert_eq!(result.palette.len(), 2);
}

#[test]
fn reimported_sprite_rerenders_identically() {
    let original = render_to_rgba(CHECKER);
    let file = write_render(CHECKER);
    let result = import_image(file.path(), Some("checker"), 16).expect("import");

    let rerendered = render_to_rgba(&result.to_pxl_lines());
    assert_eq!((rerendered.width, rerendered.height), (original.width, original.height));
    assert_eq!(rerendered.pixels, original.pixels);
    assert!(rerendered.warnings.is_empty());
}

#[test]
fn canonical_form_rerenders_identically_too() {
    let original = render_to_rgba(CHECKER);
    let file = write_render(CHECKER);
    let result = import_image(file.path(), Some("checker"), 16).expect("import");

    let rerendered = render_to_rgba(&result.to_pxl());
    assert_eq!(rerendered.pixels, original.pixels);
}

#[test]
fn canonical_form_really_is_canonical() {
    let file = write_render(CHECKER);
    let result = import_image(file.path(), Some("checker"), 16).expect("import");

    let canonical = result.to_pxl();
    assert_eq!(format_pxl(&canonical).expect("format"), canonical);
    assert_eq!(format_pxl(&result.to_pxl_lines()).expect("format lines"), canonical);
}

#[test]
fn dither_merge_collapses_a_checkerboard_to_one_token() {
    let input = concat!(
        r##"{type: "palette", name: "p", colors: {a: "#ff0000", b: "#0000ff"}}"##,
        "\n",
        r##"{type: "sprite", name: "weave", size: [4, 4], palette: "p", regions: {"##,
        r##"a: {points: [[0, 0], [2, 0], [1, 1], [3, 1], [0, 2], [2, 2], [1, 3], [3, 3]]},"##,
        r##" b: {points: [[1, 0], [3, 0], [0, 1], [2, 1], [1, 2], [3, 2], [0, 3], [2, 3]]}}}"##,
    );
    let file = write_render(input);
    let options = ImportOptions {
        name: Some("weave".into()),
        dither_handling: DitherHandling::Merge,
        ..ImportOptions::default()
    };
    let result = import_image_analyzed(file.path(), &options).expect("import");

    // the pair folds into one token carrying the averaged color
    assert_eq!(result.palette.len(), 1);
    assert_eq!(result.palette.values().next().map(String::as_str), Some("#7f007f"));

    let rerendered = render_to_rgba(&result.to_pxl_lines());
    assert_eq!((rerendered.width, rerendered.height), (4, 4));
    assert!(rerendered.warnings.is_empty());
    assert!(rerendered.pixels.chunks(4).all(|px| px == [0x7f, 0x00, 0x7f, 0xff]));
}

#[test]
fn transparency_survives_the_round_trip() {
    let input = concat!(
        r##"{type: "palette", name: "p", colors: {x: "#00ff00"}}"##,
        "\n",
        r##"{type: "sprite", name: "corner", size: [2, 2], palette: "p","##,
        r##" regions: {x: {points: [[0, 0]]}}}"##,
    );
    let original = render_to_rgba(input);
    let file = write_render(input);
    let result = import_image(file.path(), Some("corner"), 16).expect("import");

    assert_eq!(result.palette["_"], "#00000000");
    let rerendered = render_to_rgba(&result.to_pxl_lines());
    assert_eq!(rerendered.pixels, original.pixels);
}

#[test]
fn analyzed_import_carries_a_full_report() {
    let file = write_render(CHECKER);
    let options = ImportOptions { name: Some("checker".into()), ..ImportOptions::default() };
    let result = import_image_analyzed(file.path(), &options).expect("import");

    let report = result.analysis.expect("report");
    // the report shape is fixed even when individual detectors find nothing
    assert!(report.z_order.contains_key("c1"));
    assert!(report.upscale_info.is_none());
}

#[test]
fn analyzed_import_still_rerenders_to_source_size() {
    let file = write_render(CHECKER);
    let options = ImportOptions { name: Some("checker".into()), ..ImportOptions::default() };
    let result = import_image_analyzed(file.path(), &options).expect("import");

    let rerendered = render_to_rgba(&result.to_pxl_lines());
    assert_eq!((rerendered.width, rerendered.height), (2, 2));
}
