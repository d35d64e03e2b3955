use crate::common::{TRAIN_COLORS, TrainIndex, train_color};
use crate::controller::{SpeedInputChanged, speed_for_input};
use bevy::prelude::*;
use bevy::ui::RelativeCursorPosition;

pub const SLIDER_STEPS: i32 = 20;
const SLIDER_WIDTH: f32 = 320.0;
const SLIDER_HEIGHT: f32 = 14.0;
const HANDLE_WIDTH: f32 = 10.0;
const TRACK_COLOR: Color = Color::srgb(0.8, 0.8, 0.8);

/// One speed control. `raw` mirrors the value the control reports, unset until first touched.
#[derive(Component)]
pub struct SpeedSlider {
    pub train: TrainIndex,
    raw: Option<String>,
}

impl SpeedSlider {
    fn new(train: TrainIndex) -> Self {
        SpeedSlider { train, raw: None }
    }

    fn step(&self) -> i32 {
        self.raw.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
    }
}

#[derive(Component)]
struct SliderHandle(TrainIndex);

#[derive(Component)]
struct SliderValueText(TrainIndex);

pub struct SpeedPanelPlugin;

impl Plugin for SpeedPanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SpeedInputChanged>()
            .add_systems(Startup, setup)
            .add_systems(Update, (drag_sliders, update_slider_visuals).chain());
    }
}

fn setup(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            bottom: px(20),
            left: px(40),
            flex_direction: FlexDirection::Column,
            row_gap: px(10),
            ..default()
        })
        .with_children(|p| {
            for train in 0..TRAIN_COLORS.len() {
                let color = Color::from(train_color(train));
                p.spawn(Node {
                    align_items: AlignItems::Center,
                    column_gap: px(16),
                    ..default()
                })
                .with_children(|row| {
                    row.spawn((
                        Text::new(format!("Train {}", train + 1)),
                        TextFont::from_font_size(18.0),
                        TextColor(color),
                        Node {
                            width: px(80),
                            ..default()
                        },
                    ));
                    row.spawn((
                        SpeedSlider::new(train),
                        Interaction::default(),
                        RelativeCursorPosition::default(),
                        Node {
                            width: px(SLIDER_WIDTH),
                            height: px(SLIDER_HEIGHT),
                            ..default()
                        },
                        BackgroundColor(TRACK_COLOR),
                    ))
                    .with_child((
                        SliderHandle(train),
                        Node {
                            position_type: PositionType::Absolute,
                            left: percent(0),
                            width: px(HANDLE_WIDTH),
                            height: percent(100),
                            margin: UiRect::left(px(-HANDLE_WIDTH / 2.0)),
                            ..default()
                        },
                        BackgroundColor(color),
                    ));
                    row.spawn((
                        Text::new("0"),
                        TextFont::from_font_size(18.0),
                        TextColor(Color::BLACK),
                        SliderValueText(train),
                    ));
                });
            }
        });
}

/// Step under the cursor. `normalized_x` runs from -0.5 at the left edge to 0.5 at the right one.
fn slider_step(normalized_x: f32) -> i32 {
    ((normalized_x + 0.5).clamp(0.0, 1.0) * SLIDER_STEPS as f32).round() as i32
}

fn drag_sliders(
    mut sliders: Query<(&Interaction, &RelativeCursorPosition, &mut SpeedSlider)>,
    mut changes: MessageWriter<SpeedInputChanged>,
) {
    for (interaction, cursor, mut slider) in &mut sliders {
        if *interaction != Interaction::Pressed {
            continue;
        }
        let Some(normalized) = cursor.normalized else {
            continue;
        };
        let value = slider_step(normalized.x).to_string();
        if slider.raw.as_deref() == Some(value.as_str()) {
            continue;
        }
        slider.raw = Some(value);
        changes.write(SpeedInputChanged {
            train: slider.train,
            raw: slider.raw.clone(),
        });
    }
}

fn update_slider_visuals(
    sliders: Query<&SpeedSlider, Changed<SpeedSlider>>,
    mut handles: Query<(&SliderHandle, &mut Node)>,
    mut texts: Query<(&SliderValueText, &mut Text)>,
) {
    for slider in &sliders {
        let step = slider.step();
        for (handle, mut node) in &mut handles {
            if handle.0 == slider.train {
                node.left = percent(step as f32 * 100.0 / SLIDER_STEPS as f32);
            }
        }
        for (label, mut text) in &mut texts {
            if label.0 == slider.train {
                text.0 = format!("{} (speed {})", step, speed_for_input(slider.raw.as_deref()));
            }
        }
    }
}
