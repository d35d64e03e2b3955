use crate::common::SectionId;
use bevy::prelude::*;
use itertools::Itertools;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

pub const LAYOUT_PATH: &str = "assets/layout.toml";
const DEFAULT_TICK_MS: u64 = 1000;

fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("cannot read layout: {0}")]
    Io(#[from] io::Error),
    #[error("cannot parse layout: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid layout: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Layout {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    pub loops: Vec<LoopData>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct LoopData {
    #[serde(default)]
    pub greedy: bool,
    pub tracks: Vec<TrackData>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TrackData {
    pub start: [f32; 2],
    pub end: [f32; 2],
    #[serde(default)]
    pub section: Option<SectionId>,
}

impl TrackData {
    pub fn new(start: [f32; 2], end: [f32; 2], section: Option<SectionId>) -> Self {
        TrackData { start, end, section }
    }
}

impl Layout {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Layout, LayoutError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Layout, LayoutError> {
        let layout: Layout = toml::from_str(contents)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Loads the layout at `path`, falling back to the built-in one when it is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Layout {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(layout) => {
                info!("Loaded layout with {} loops from {}", layout.loops.len(), path.display());
                layout
            }
            Err(LayoutError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Layout file {} not found, using the built-in layout", path.display());
                Layout::default()
            }
            Err(err) => {
                error!("Failed to load {}: {}, using the built-in layout", path.display(), err);
                Layout::default()
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), LayoutError> {
        if self.tick_ms == 0 {
            return Err(LayoutError::Invalid("tick_ms must be positive".into()));
        }
        if self.loops.is_empty() {
            return Err(LayoutError::Invalid("no loops defined".into()));
        }
        for (loop_idx, track_loop) in self.loops.iter().enumerate() {
            if track_loop.tracks.is_empty() {
                return Err(LayoutError::Invalid(format!("loop {} has no tracks", loop_idx)));
            }
            if let Some(idx) = track_loop.tracks.iter().position(|t| t.start == t.end) {
                return Err(LayoutError::Invalid(format!(
                    "loop {}: track {} has zero length",
                    loop_idx, idx
                )));
            }
            let gap = track_loop
                .tracks
                .iter()
                .enumerate()
                .circular_tuple_windows()
                .find(|((_, a), (_, b))| a.end != b.start);
            if let Some(((idx, a), (_, b))) = gap {
                return Err(LayoutError::Invalid(format!(
                    "loop {}: track {} ends at {:?} but the next one starts at {:?}",
                    loop_idx, idx, a.end, b.start
                )));
            }
        }
        Ok(())
    }
}

impl Default for Layout {
    /// Four loops tracing the canvas quadrants. The inner edges around (500, 300) are
    /// shared between neighbouring loops, numbered clockwise from the top.
    fn default() -> Self {
        let t = TrackData::new;
        Layout {
            tick_ms: DEFAULT_TICK_MS,
            loops: vec![
                LoopData {
                    greedy: true,
                    tracks: vec![
                        t([100.0, 300.0], [100.0, 100.0], None),
                        t([100.0, 100.0], [500.0, 100.0], None),
                        t([500.0, 100.0], [500.0, 300.0], Some(1)),
                        t([500.0, 300.0], [100.0, 300.0], Some(4)),
                    ],
                },
                LoopData {
                    greedy: false,
                    tracks: vec![
                        t([900.0, 100.0], [900.0, 300.0], None),
                        t([900.0, 300.0], [500.0, 300.0], Some(2)),
                        t([500.0, 300.0], [500.0, 100.0], Some(1)),
                        t([500.0, 100.0], [900.0, 100.0], None),
                    ],
                },
                LoopData {
                    greedy: false,
                    tracks: vec![
                        t([100.0, 500.0], [100.0, 300.0], None),
                        t([100.0, 300.0], [500.0, 300.0], Some(4)),
                        t([500.0, 300.0], [500.0, 500.0], Some(3)),
                        t([500.0, 500.0], [100.0, 500.0], None),
                    ],
                },
                LoopData {
                    greedy: true,
                    tracks: vec![
                        t([900.0, 500.0], [500.0, 500.0], None),
                        t([500.0, 500.0], [500.0, 300.0], Some(3)),
                        t([500.0, 300.0], [900.0, 300.0], Some(2)),
                        t([900.0, 300.0], [900.0, 500.0], None),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = Layout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.loops.len(), 4);
        let greedy: Vec<bool> = layout.loops.iter().map(|l| l.greedy).collect();
        assert_eq!(greedy, [true, false, false, true]);
    }

    #[test]
    fn test_parse_layout() {
        let layout = Layout::from_toml(
            r#"
            tick_ms = 250

            [[loops]]
            greedy = true
            tracks = [
                { start = [0.0, 0.0], end = [10.0, 0.0] },
                { start = [10.0, 0.0], end = [10.0, 10.0], section = 7 },
                { start = [10.0, 10.0], end = [0.0, 0.0] },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(layout.tick_ms, 250);
        assert_eq!(layout.loops.len(), 1);
        assert!(layout.loops[0].greedy);
        assert_eq!(layout.loops[0].tracks[1].section, Some(7));
        assert_eq!(layout.loops[0].tracks[0].section, None);
    }

    #[test]
    fn test_tick_defaults_to_one_second() {
        let layout = Layout::from_toml(
            r#"
            [[loops]]
            tracks = [
                { start = [0.0, 0.0], end = [10.0, 0.0] },
                { start = [10.0, 0.0], end = [0.0, 0.0] },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(layout.tick_ms, 1000);
        assert!(!layout.loops[0].greedy);
    }

    #[test]
    fn test_broken_loop_is_rejected() {
        let result = Layout::from_toml(
            r#"
            [[loops]]
            tracks = [
                { start = [0.0, 0.0], end = [10.0, 0.0] },
                { start = [20.0, 0.0], end = [0.0, 0.0] },
            ]
            "#,
        );
        assert!(matches!(result, Err(LayoutError::Invalid(_))));
    }

    #[test]
    fn test_zero_length_track_is_rejected() {
        let result = Layout::from_toml(
            r#"
            [[loops]]
            tracks = [{ start = [5.0, 5.0], end = [5.0, 5.0] }]
            "#,
        );
        assert!(matches!(result, Err(LayoutError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Layout::from_toml("loops = 3");
        assert!(matches!(result, Err(LayoutError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let layout = Layout::load_or_default("does/not/exist.toml");
        assert_eq!(layout, Layout::default());
    }
}
