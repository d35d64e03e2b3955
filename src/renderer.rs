use crate::common::{PaletteColor, TrainPosition, train_color};
use bevy::math::{Rect, Vec2, vec2};

pub const CANVAS_WIDTH: f32 = 1000.0;
pub const CANVAS_HEIGHT: f32 = 600.0;

const QUADRANT_WIDTH: f32 = 400.0;
const QUADRANT_HEIGHT: f32 = 200.0;
const QUADRANT_MARGIN: f32 = 100.0;
const OUTLINE_WIDTH: f32 = 5.0;
const LABEL_FONT_SIZE: f32 = 36.0;
const TRAIN_SIZE: f32 = 10.0;

/// Which canvas edge a quadrant keeps its margin from.
#[derive(Copy, Clone)]
enum Edge {
    Near,
    Far,
}

impl Edge {
    fn offset(self, canvas: f32, size: f32) -> f32 {
        match self {
            Edge::Near => QUADRANT_MARGIN,
            Edge::Far => canvas - size - QUADRANT_MARGIN,
        }
    }
}

struct Quadrant {
    color: PaletteColor,
    label: &'static str,
    x: Edge,
    y: Edge,
}

const QUADRANTS: [Quadrant; 4] = [
    Quadrant {
        color: PaletteColor::Red,
        label: "1",
        x: Edge::Near,
        y: Edge::Near,
    },
    Quadrant {
        color: PaletteColor::Blue,
        label: "2",
        x: Edge::Far,
        y: Edge::Near,
    },
    Quadrant {
        color: PaletteColor::Green,
        label: "3",
        x: Edge::Near,
        y: Edge::Far,
    },
    Quadrant {
        color: PaletteColor::Yellow,
        label: "4",
        x: Edge::Far,
        y: Edge::Far,
    },
];

impl Quadrant {
    fn rect(&self, canvas: Vec2) -> Rect {
        let min = vec2(
            self.x.offset(canvas.x, QUADRANT_WIDTH),
            self.y.offset(canvas.y, QUADRANT_HEIGHT),
        );
        Rect::from_corners(min, min + vec2(QUADRANT_WIDTH, QUADRANT_HEIGHT))
    }
}

/// Drawing target in canvas coordinates: origin at the top-left corner, y pointing down.
pub trait Surface {
    /// Clears everything and resizes the drawing area.
    fn reset(&mut self, size: Vec2);

    fn stroke_rect(&mut self, rect: Rect, color: PaletteColor, line_width: f32);

    fn fill_rect(&mut self, rect: Rect, color: PaletteColor);

    fn fill_text(&mut self, text: &str, center: Vec2, font_size: f32, color: PaletteColor);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    StrokeRect {
        rect: Rect,
        color: PaletteColor,
        line_width: f32,
    },
    FillRect {
        rect: Rect,
        color: PaletteColor,
    },
    FillText {
        text: String,
        center: Vec2,
        font_size: f32,
        color: PaletteColor,
    },
}

/// A surface that records draw calls in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl Surface for Frame {
    fn reset(&mut self, size: Vec2) {
        self.size = size;
        self.commands.clear();
    }

    fn stroke_rect(&mut self, rect: Rect, color: PaletteColor, line_width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: PaletteColor) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_text(&mut self, text: &str, center: Vec2, font_size: f32, color: PaletteColor) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            center,
            font_size,
            color,
        });
    }
}

/// Redraws the whole canvas: the four quadrant outlines with their labels, then one square per train.
pub fn render_canvas<S: Surface + ?Sized>(surface: &mut S, trains: &[TrainPosition]) {
    let canvas = vec2(CANVAS_WIDTH, CANVAS_HEIGHT);
    surface.reset(canvas);

    for quadrant in &QUADRANTS {
        let rect = quadrant.rect(canvas);
        surface.stroke_rect(rect, quadrant.color, OUTLINE_WIDTH);
        surface.fill_text(quadrant.label, rect.center(), LABEL_FONT_SIZE, quadrant.color);
    }

    for (index, train) in trains.iter().enumerate() {
        let rect = Rect::from_center_size((*train).into(), Vec2::splat(TRAIN_SIZE));
        surface.fill_rect(rect, train_color(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn render(trains: &[TrainPosition]) -> Frame {
        let mut frame = Frame::default();
        render_canvas(&mut frame, trains);
        frame
    }

    fn outlines(frame: &Frame) -> Vec<(Rect, PaletteColor)> {
        frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect { rect, color, .. } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    fn squares(frame: &Frame) -> Vec<(Rect, PaletteColor)> {
        frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_canvas_size() {
        let frame = render(&[]);
        assert_eq!(frame.size, vec2(1000.0, 600.0));
    }

    #[test]
    fn test_quadrant_geometry() {
        let frame = render(&[]);
        let outlines = outlines(&frame);
        assert_eq!(outlines.len(), 4);

        let expected = [
            (vec2(100.0, 100.0), PaletteColor::Red),
            (vec2(500.0, 100.0), PaletteColor::Blue),
            (vec2(100.0, 300.0), PaletteColor::Green),
            (vec2(500.0, 300.0), PaletteColor::Yellow),
        ];
        for ((rect, color), (origin, expected_color)) in outlines.iter().zip_eq(expected) {
            assert_eq!(rect.min, origin);
            assert_eq!(rect.size(), vec2(400.0, 200.0));
            assert_eq!(*color, expected_color);
        }

        let widths: Vec<f32> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect { line_width, .. } => Some(*line_width),
                _ => None,
            })
            .collect();
        assert_eq!(widths, [5.0; 4]);
    }

    #[test]
    fn test_quadrant_labels() {
        let frame = render(&[]);
        let labels: Vec<(&str, Vec2, f32)> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText {
                    text,
                    center,
                    font_size,
                    ..
                } => Some((text.as_str(), *center, *font_size)),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            [
                ("1", vec2(300.0, 200.0), 36.0),
                ("2", vec2(700.0, 200.0), 36.0),
                ("3", vec2(300.0, 400.0), 36.0),
                ("4", vec2(700.0, 400.0), 36.0),
            ]
        );
    }

    #[test]
    fn test_one_square_per_train() {
        for count in 0..=4 {
            let trains: Vec<TrainPosition> = (0..count)
                .map(|i| TrainPosition::new(100.0 + 50.0 * i as f32, 300.0))
                .collect();
            let frame = render(&trains);
            assert_eq!(outlines(&frame).len(), 4);

            let squares = squares(&frame);
            assert_eq!(squares.len(), count);
            for (i, (rect, color)) in squares.iter().enumerate() {
                assert_eq!(rect.min, vec2(95.0 + 50.0 * i as f32, 295.0));
                assert_eq!(rect.size(), vec2(10.0, 10.0));
                assert_eq!(*color, train_color(i));
            }
        }
    }

    #[test]
    fn test_train_palette() {
        let trains = [TrainPosition::new(500.0, 300.0); 5];
        let colors: Vec<PaletteColor> = squares(&render(&trains)).into_iter().map(|(_, c)| c).collect();
        assert_eq!(
            colors,
            [
                PaletteColor::Pink,
                PaletteColor::Brown,
                PaletteColor::Orange,
                PaletteColor::Purple,
                PaletteColor::Pink,
            ]
        );
    }

    #[test]
    fn test_trains_drawn_after_quadrants() {
        let frame = render(&[TrainPosition::new(10.0, 10.0)]);
        assert!(matches!(frame.commands.last(), Some(DrawCommand::FillRect { .. })));
        assert_eq!(frame.commands.len(), 9);
    }

    #[test]
    fn test_redraw_replaces_previous_frame() {
        let mut frame = Frame::default();
        render_canvas(&mut frame, &[TrainPosition::new(150.0, 100.0), TrainPosition::new(900.0, 200.0)]);
        render_canvas(&mut frame, &[TrainPosition::new(400.0, 300.0)]);

        assert_eq!(frame, render(&[TrainPosition::new(400.0, 300.0)]));
        let squares = squares(&frame);
        assert_eq!(squares.len(), 1);
        assert_eq!(squares[0].0.min, vec2(395.0, 295.0));
    }
}
