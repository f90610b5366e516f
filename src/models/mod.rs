//! Data model for PXL objects (palettes, sprites, variants, animations).

mod animation;
mod object;
mod palette;
mod region;
mod sprite;
mod variant;

pub use animation::Animation;
pub use object::{PxlObject, Warning};
pub use palette::{Palette, PaletteRef};
pub use region::RegionDef;
pub use sprite::Sprite;
pub use variant::Variant;
