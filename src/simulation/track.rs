use crate::common::{SectionId, TrainIndex};
use crate::layout::{LoopData, TrackData};
use bevy::math::{Vec2, vec2};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Track {
    start: Vec2,
    end: Vec2,
    heading: Vec2,
    pub length: f32,
    pub section: Option<SectionId>,
}

impl Track {
    pub fn new(start: Vec2, end: Vec2, section: Option<SectionId>) -> Self {
        let delta = end - start;
        Track {
            start,
            end,
            heading: delta.normalize_or_zero(),
            length: delta.length(),
            section,
        }
    }

    pub fn point_at(&self, offset: f32) -> Vec2 {
        if offset >= self.length {
            self.end
        } else {
            self.start + self.heading * offset.max(0.0)
        }
    }
}

impl From<&TrackData> for Track {
    fn from(data: &TrackData) -> Self {
        Track::new(
            vec2(data.start[0], data.start[1]),
            vec2(data.end[0], data.end[1]),
            data.section,
        )
    }
}

/// Closed sequence of tracks; the first track follows the last one.
#[derive(Debug, Clone)]
pub struct TrackLoop {
    tracks: Vec<Track>,
    length: f32,
    guarded: bool,
}

impl TrackLoop {
    pub fn new(tracks: Vec<Track>) -> Self {
        assert!(!tracks.is_empty(), "a loop needs at least one track");
        let length = tracks.iter().map(|t| t.length).sum();
        let guarded = tracks.iter().any(|t| t.section.is_some());
        TrackLoop {
            tracks,
            length,
            guarded,
        }
    }

    pub fn get(&self, index: usize) -> &Track {
        &self.tracks[index % self.tracks.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Total length of one lap.
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn has_guarded_tracks(&self) -> bool {
        self.guarded
    }
}

impl From<&LoopData> for TrackLoop {
    fn from(data: &LoopData) -> Self {
        TrackLoop::new(data.tracks.iter().map(Track::from).collect())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackPoint {
    pub track: usize,
    pub offset: f32,
}

impl TrackPoint {
    pub fn new(track: usize, offset: f32) -> Self {
        TrackPoint { track, offset }
    }
}

/// Owners of the shared sections. A section absent from the map is free.
#[derive(Default, Debug)]
pub struct SectionMap {
    owners: HashMap<SectionId, TrainIndex>,
}

impl SectionMap {
    pub fn owner(&self, section: SectionId) -> Option<TrainIndex> {
        self.owners.get(&section).copied()
    }

    pub fn is_available(&self, section: SectionId, train: TrainIndex) -> bool {
        self.owner(section).is_none_or(|owner| owner == train)
    }

    pub fn reserve(&mut self, section: SectionId, train: TrainIndex) {
        self.owners.insert(section, train);
    }

    /// Frees the section if `train` holds it; reservations of other trains are left alone.
    pub fn release(&mut self, section: SectionId, train: TrainIndex) {
        if self.owner(section) == Some(train) {
            self.owners.remove(&section);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_geometry() {
        let track = Track::new(vec2(100.0, 300.0), vec2(100.0, 100.0), None);
        assert_eq!(track.length, 200.0);
        assert_eq!(track.point_at(0.0), vec2(100.0, 300.0));
        assert_eq!(track.point_at(90.0), vec2(100.0, 210.0));
        assert_eq!(track.point_at(250.0), vec2(100.0, 100.0));
    }

    #[test]
    fn test_loop_wraps() {
        let data = LoopData {
            greedy: false,
            tracks: vec![
                TrackData::new([0.0, 0.0], [10.0, 0.0], None),
                TrackData::new([10.0, 0.0], [10.0, 10.0], Some(2)),
                TrackData::new([10.0, 10.0], [0.0, 0.0], None),
            ],
        };
        let track_loop = TrackLoop::from(&data);
        assert_eq!(track_loop.len(), 3);
        assert_eq!(track_loop.next_index(0), 1);
        assert_eq!(track_loop.next_index(2), 0);
        assert_eq!(track_loop.get(1).section, Some(2));
        assert_eq!(track_loop.get(4).section, Some(2));
        assert_eq!(track_loop.length(), 10.0 + 10.0 + 200.0f32.sqrt());
        assert!(track_loop.has_guarded_tracks());
    }

    #[test]
    fn test_section_reservations() {
        let mut sections = SectionMap::default();
        assert!(sections.is_available(1, 0));

        sections.reserve(1, 0);
        assert_eq!(sections.owner(1), Some(0));
        assert!(sections.is_available(1, 0));
        assert!(!sections.is_available(1, 2));

        // only the owner can free it
        sections.release(1, 2);
        assert_eq!(sections.owner(1), Some(0));
        sections.release(1, 0);
        assert_eq!(sections.owner(1), None);
        assert!(sections.is_available(1, 2));
    }
}
