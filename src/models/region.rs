//! Region geometry inside a sprite.

use serde::{Deserialize, Serialize};

/// One paintable region: geometry plus z paint order.
///
/// Geometry is either an explicit point list or a rectangle
/// `[x, y, width, height]` covering all integer coordinates inside it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionDef {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub points: Option<Vec<[i64; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rect: Option<[i64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub z: Option<i64>,
}

impl RegionDef {
    /// Paint order; regions without an explicit z paint first.
    pub fn z_order(&self) -> i64 {
        self.z.unwrap_or(0)
    }

    /// All integer coordinates covered by this region, in declaration order
    /// for point lists and row-major order for rects.
    pub fn coordinates(&self) -> Vec<(i64, i64)> {
        let mut coords = Vec::new();
        if let Some(points) = &self.points {
            coords.extend(points.iter().map(|p| (p[0], p[1])));
        }
        if let Some([x, y, w, h]) = self.rect {
            for dy in 0..h.max(0) {
                for dx in 0..w.max(0) {
                    coords.push((x + dx, y + dy));
                }
            }
        }
        coords
    }
}
