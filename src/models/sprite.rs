//! Sprite type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{PaletteRef, RegionDef};

/// A sprite: named canvas with z-ordered token regions.
///
/// The region map key is the palette token; entry order is the tie-break
/// for regions sharing a z value, so it must survive parse and format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<[u32; 2]>,
    #[serde(default)]
    pub palette: PaletteRef,
    #[serde(default)]
    pub regions: IndexMap<String, RegionDef>,
}

impl Sprite {
    /// Declared size, or the tight bounding box of all regions when absent.
    pub fn dimensions(&self) -> (u32, u32) {
        if let Some([w, h]) = self.size {
            return (w, h);
        }
        let mut max_x: i64 = -1;
        let mut max_y: i64 = -1;
        for region in self.regions.values() {
            for (x, y) in region.coordinates() {
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
        // saturate rather than truncate for absurd coordinates
        let clamp = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
        (clamp(max_x + 1), clamp(max_y + 1))
    }
}
