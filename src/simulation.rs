pub mod engine;
pub mod track;
pub mod train;

use crate::backend::{Backend, OfflineBackend};
use crate::controller::Controller;
use crate::layout::{LAYOUT_PATH, Layout};
use bevy::prelude::*;
use engine::Engine;
use std::sync::Arc;

/// Starts the bundled track simulation and hands it to the controller as its backend.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let layout = Layout::load_or_default(LAYOUT_PATH);
        let backend: Arc<dyn Backend> = match Engine::start(&layout) {
            Ok(engine) => Arc::new(engine),
            Err(err) => {
                error!("Failed to start the simulation: {}", err);
                Arc::new(OfflineBackend)
            }
        };
        app.insert_resource(Controller::new(backend));
    }
}
