mod backend;
mod canvas;
mod common;
mod controller;
mod layout;
mod renderer;
mod simulation;
mod speed_panel;

use crate::canvas::CanvasPlugin;
use crate::controller::ControllerPlugin;
use crate::renderer::CANVAS_WIDTH;
use crate::simulation::SimulationPlugin;
use crate::speed_panel::SpeedPanelPlugin;
use bevy::prelude::*;

const WINDOW_HEIGHT: u32 = 820;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Train Loops".into(),
                resolution: (CANVAS_WIDTH as u32, WINDOW_HEIGHT).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::WHITE))
        .add_plugins((SimulationPlugin, ControllerPlugin, CanvasPlugin, SpeedPanelPlugin))
        .run();
}
