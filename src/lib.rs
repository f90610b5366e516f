//! PXL - a pixel art compiler and decompiler
//!
//! This library provides functionality to:
//! - Parse relaxed-JSON text into palette, sprite, variant, and animation objects
//! - Validate a corpus and report recoverable diagnostics
//! - Render sprites to RGBA buffers and deterministic PNG bytes
//! - Import PNG images back into palette and sprite definitions
//! - Format text into a canonical layout

pub mod analyze;
pub mod codec;
pub mod color;
pub mod fmt;
pub mod import;
pub mod models;
pub mod parser;
pub mod registry;
pub mod renderer;
pub mod validate;

pub use color::{generate_ramp, parse_color, ColorError};
pub use fmt::{format_pxl, FormatError};
pub use import::{
    import_image, import_image_analyzed, AnalysisReport, DitherHandling, ImportError,
    ImportOptions, ImportResult,
};
pub use parser::{parse, ParseResult};
pub use registry::Registry;
pub use renderer::{render_to_png, render_to_rgba, PngRender, RenderOutput};
pub use validate::{validate, validate_file};
