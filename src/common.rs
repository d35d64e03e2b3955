use bevy::color::palettes::css;
use bevy::prelude::*;

pub type TrainIndex = usize;
pub type SectionId = u32;

/// Position of a train in canvas space: origin at the top-left corner, y pointing down.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TrainPosition {
    pub x: f32,
    pub y: f32,
}

impl TrainPosition {
    pub fn new(x: f32, y: f32) -> Self {
        TrainPosition { x, y }
    }
}

impl From<(f32, f32)> for TrainPosition {
    fn from((x, y): (f32, f32)) -> Self {
        TrainPosition { x, y }
    }
}

impl From<TrainPosition> for Vec2 {
    fn from(p: TrainPosition) -> Self {
        vec2(p.x, p.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    Red,
    Blue,
    Green,
    Yellow,
    Pink,
    Brown,
    Orange,
    Purple,
}

impl From<PaletteColor> for Color {
    fn from(c: PaletteColor) -> Self {
        match c {
            PaletteColor::Red => css::RED,
            PaletteColor::Blue => css::BLUE,
            PaletteColor::Green => css::GREEN,
            PaletteColor::Yellow => css::YELLOW,
            PaletteColor::Pink => css::PINK,
            PaletteColor::Brown => css::BROWN,
            PaletteColor::Orange => css::ORANGE,
            PaletteColor::Purple => css::PURPLE,
        }
        .into()
    }
}

pub const TRAIN_COLORS: [PaletteColor; 4] = [
    PaletteColor::Pink,
    PaletteColor::Brown,
    PaletteColor::Orange,
    PaletteColor::Purple,
];

/// Color of the train at `index`. Indices past the palette wrap around.
pub fn train_color(index: TrainIndex) -> PaletteColor {
    TRAIN_COLORS[index % TRAIN_COLORS.len()]
}
