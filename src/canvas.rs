use crate::common::TrainPosition;
use crate::renderer::{DrawCommand, Frame, render_canvas};
use bevy::prelude::*;

/// Distance from the window centre to the canvas centre, keeps room for the speed panel below.
const CANVAS_OFFSET_Y: f32 = 110.0;

/// Root entity the canvas content is spawned under. Without it nothing is polled or drawn.
#[derive(Component)]
#[require(Transform, Visibility)]
pub struct Canvas;

/// Most recent frame produced by the renderer.
#[derive(Resource, Default)]
pub struct CanvasFrame {
    frame: Frame,
    generation: u64,
}

impl CanvasFrame {
    pub fn redraw(&mut self, trains: &[TrainPosition]) {
        render_canvas(&mut self.frame, trains);
        self.generation += 1;
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of redraws so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct CanvasPlugin;

impl Plugin for CanvasPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CanvasFrame>()
            .add_systems(Startup, setup)
            .add_systems(Update, paint.run_if(resource_changed::<CanvasFrame>));
    }
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
    commands.spawn((Canvas, Transform::from_xyz(0.0, CANVAS_OFFSET_Y, 0.0)));
}

/// Canvas coordinates to the canvas entity's local space (centered, y up).
fn to_local(point: Vec2, size: Vec2) -> Vec2 {
    vec2(point.x - size.x / 2.0, size.y / 2.0 - point.y)
}

/// The four edges of a stroked rectangle as (center, size) pairs in canvas coordinates.
/// The stroke straddles the outline, so corners are covered by the horizontal edges.
fn outline_edges(rect: Rect, line_width: f32) -> [(Vec2, Vec2); 4] {
    let size = rect.size();
    let center = rect.center();
    let horizontal = vec2(size.x + line_width, line_width);
    let vertical = vec2(line_width, size.y - line_width);
    [
        (vec2(center.x, rect.min.y), horizontal),
        (vec2(center.x, rect.max.y), horizontal),
        (vec2(rect.min.x, center.y), vertical),
        (vec2(rect.max.x, center.y), vertical),
    ]
}

fn paint(frame: Res<CanvasFrame>, canvas: Single<Entity, With<Canvas>>, mut commands: Commands) {
    let frame = frame.frame();
    let size = frame.size;

    commands
        .entity(*canvas)
        .despawn_related::<Children>()
        .with_children(|p| {
            for (order, command) in frame.commands.iter().enumerate() {
                // later commands paint over earlier ones
                let z = order as f32 * 0.01;
                match command {
                    DrawCommand::StrokeRect {
                        rect,
                        color,
                        line_width,
                    } => {
                        for (center, edge) in outline_edges(*rect, *line_width) {
                            p.spawn((
                                Sprite::from_color(Color::from(*color), edge),
                                Transform::from_translation(to_local(center, size).extend(z)),
                            ));
                        }
                    }
                    DrawCommand::FillRect { rect, color } => {
                        p.spawn((
                            Sprite::from_color(Color::from(*color), rect.size()),
                            Transform::from_translation(to_local(rect.center(), size).extend(z)),
                        ));
                    }
                    DrawCommand::FillText {
                        text,
                        center,
                        font_size,
                        color,
                    } => {
                        p.spawn((
                            Text2d::new(text.clone()),
                            TextFont::from_font_size(*font_size),
                            TextColor(Color::from(*color)),
                            Transform::from_translation(to_local(*center, size).extend(z)),
                        ));
                    }
                }
            }
        });
    debug!("Painted canvas frame with {} commands", frame.commands.len());
}
