//! Animation type.

use serde::{Deserialize, Serialize};

/// An ordered list of frame sprite names with a per-frame duration.
///
/// The engine validates frame references; playback timing is a caller
/// concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    #[serde(default)]
    pub frames: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frames() {
        let a: Animation = json5::from_str(
            r#"{name: "walk", frames: ["walk_0", "walk_1"], duration: 100}"#,
        )
        .unwrap();
        assert_eq!(a.frames.len(), 2);
        assert_eq!(a.duration, Some(100.0));
    }
}
