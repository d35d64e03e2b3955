use crate::common::{SectionId, TrainIndex};
use crate::simulation::track::{SectionMap, TrackLoop, TrackPoint};
use arrayvec::ArrayVec;
use bevy::log::debug;
use bevy::math::Vec2;

#[derive(Debug)]
pub struct Train {
    pub id: TrainIndex,
    track_loop: TrackLoop,
    position: TrackPoint,
    speed: i32,
    greedy: bool,
}

impl Train {
    pub fn new(id: TrainIndex, track_loop: TrackLoop, greedy: bool) -> Self {
        Train {
            id,
            track_loop,
            position: TrackPoint::new(0, 0.0),
            speed: 0,
            greedy,
        }
    }

    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn track_point(&self) -> TrackPoint {
        self.position
    }

    pub fn position(&self) -> Vec2 {
        self.track_loop.get(self.position.track).point_at(self.position.offset)
    }

    /// Moves the train by one tick worth of distance. Negative speeds hold the train in place.
    pub fn advance(&mut self, sections: &mut SectionMap) {
        let mut distance = self.speed.max(0) as f64;
        // without a guarded track to stop at, whole laps change nothing
        if !self.track_loop.has_guarded_tracks() {
            let lap = self.track_loop.length() as f64;
            distance = if lap > 0.0 { distance % lap } else { 0.0 };
        }
        self.advance_by(distance as f32, sections);
    }

    fn advance_by(&mut self, distance: f32, sections: &mut SectionMap) {
        let mut remaining = distance;
        while remaining > 0.0 {
            let track = self.track_loop.get(self.position.track);
            let available = track.length - self.position.offset;
            if remaining < available {
                self.position.offset += remaining;
                return;
            }

            remaining -= available;
            self.position.offset = track.length;
            if let Some(section) = track.section {
                sections.release(section, self.id);
            }

            let next = self.track_loop.next_index(self.position.track);
            if self.track_loop.get(next).section.is_none() {
                self.position = TrackPoint::new(next, 0.0);
                continue;
            }

            // guarded tracks are entered from their start, the leftover distance is lost
            if self.reserve_ahead(next, sections) {
                self.position = TrackPoint::new(next, 0.0);
            }
            return;
        }
    }

    /// Reserves the guarded track at `next` and, for greedy trains, the guarded track after it.
    /// Nothing is reserved unless every wanted section is available.
    fn reserve_ahead(&self, next: usize, sections: &mut SectionMap) -> bool {
        let mut wanted: ArrayVec<SectionId, 2> = ArrayVec::new();
        wanted.extend(self.track_loop.get(next).section);
        if self.greedy {
            let after = self.track_loop.next_index(next);
            if let Some(section) = self.track_loop.get(after).section {
                if !wanted.contains(&section) {
                    wanted.push(section);
                }
            }
        }

        if let Some(&blocked) = wanted.iter().find(|&&s| !sections.is_available(s, self.id)) {
            debug!(
                "Train {} waits for section {} held by train {:?}",
                self.id,
                blocked,
                sections.owner(blocked)
            );
            return false;
        }
        for section in wanted {
            sections.reserve(section, self.id);
        }
        true
    }
}
