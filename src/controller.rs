use crate::backend::{Backend, BackendResult};
use crate::canvas::{Canvas, CanvasFrame};
use crate::common::{TrainIndex, TrainPosition};
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;
use std::sync::Arc;
use std::time::Duration;

pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Raw slider steps are multiplied by this before they are sent to the backend.
pub const SPEED_SCALE: i32 = 5;

/// A slider reported a new value. `raw` is the control's value as-is, `None` if it has none.
#[derive(Message, Clone, Debug)]
pub struct SpeedInputChanged {
    pub train: TrainIndex,
    pub raw: Option<String>,
}

/// Reads a control value like a lenient integer parser: leading whitespace and sign,
/// then as many digits as there are. Anything unreadable counts as zero, values out of
/// range saturate.
pub fn parse_speed_input(raw: Option<&str>) -> i32 {
    let Some(raw) = raw else {
        return 0;
    };
    let trimmed = raw.trim_start();
    let (negative, sign_len) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let digits = trimmed[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return 0;
    }
    match trimmed[..sign_len + digits].parse::<i32>() {
        Ok(value) => value,
        Err(_) if negative => i32::MIN,
        Err(_) => i32::MAX,
    }
}

pub fn speed_for_input(raw: Option<&str>) -> i32 {
    parse_speed_input(raw).saturating_mul(SPEED_SCALE)
}

/// Owns the backend handle and the poll schedule.
#[derive(Resource)]
pub struct Controller {
    backend: Arc<dyn Backend>,
    timer: Timer,
    polled_once: bool,
}

impl Controller {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Controller {
            backend,
            timer: Timer::new(POLL_INTERVAL, TimerMode::Repeating),
            polled_once: false,
        }
    }

    /// Advances the poll schedule. The first call is always due, then once per interval.
    fn poll_due(&mut self, delta: Duration) -> bool {
        let finished = self.timer.tick(delta).just_finished();
        let first = !self.polled_once;
        self.polled_once = true;
        first || finished
    }

    pub fn fetch_trains(&self) -> Task<BackendResult<Vec<(f32, f32)>>> {
        AsyncComputeTaskPool::get().spawn(self.backend.get_trains())
    }

    pub fn set_speed(&self, train: TrainIndex, speed: i32) -> Task<BackendResult<()>> {
        AsyncComputeTaskPool::get().spawn(self.backend.set_train_speed(train, speed))
    }
}

#[derive(Resource, Default, Deref, DerefMut)]
struct PendingFetches(Vec<Task<BackendResult<Vec<(f32, f32)>>>>);

struct PendingCommand {
    train: TrainIndex,
    speed: i32,
    task: Task<BackendResult<()>>,
}

#[derive(Resource, Default, Deref, DerefMut)]
struct PendingCommands(Vec<PendingCommand>);

/// Polls the backend and relays speed inputs. Expects a [`Controller`] resource.
pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SpeedInputChanged>()
            .init_resource::<CanvasFrame>()
            .init_resource::<PendingFetches>()
            .init_resource::<PendingCommands>()
            .add_systems(
                Update,
                (
                    (poll_backend, finish_fetches).chain(),
                    (send_speed_commands, finish_speed_commands).chain(),
                ),
            );
    }
}

fn poll_backend(
    time: Res<Time<Real>>,
    mut controller: ResMut<Controller>,
    canvas: Query<(), With<Canvas>>,
    mut pending: ResMut<PendingFetches>,
) {
    if !controller.poll_due(time.delta()) {
        return;
    }
    if canvas.is_empty() {
        debug!("No canvas, skipping train poll");
        return;
    }
    pending.push(controller.fetch_trains());
}

fn finish_fetches(mut pending: ResMut<PendingFetches>, mut canvas_frame: ResMut<CanvasFrame>) {
    pending.retain_mut(|task| match future::block_on(future::poll_once(task)) {
        Some(Ok(positions)) => {
            let trains: Vec<TrainPosition> = positions.into_iter().map(TrainPosition::from).collect();
            canvas_frame.redraw(&trains);
            false
        }
        Some(Err(err)) => {
            warn!("Train poll failed, keeping the previous frame: {}", err);
            false
        }
        None => true,
    });
}

fn send_speed_commands(
    mut inputs: MessageReader<SpeedInputChanged>,
    controller: Res<Controller>,
    mut pending: ResMut<PendingCommands>,
) {
    for input in inputs.read() {
        let speed = speed_for_input(input.raw.as_deref());
        debug!("Slider {} set to {:?}, sending speed {}", input.train + 1, input.raw, speed);
        pending.push(PendingCommand {
            train: input.train,
            speed,
            task: controller.set_speed(input.train, speed),
        });
    }
}

fn finish_speed_commands(mut pending: ResMut<PendingCommands>) {
    pending.retain_mut(|cmd| match future::block_on(future::poll_once(&mut cmd.task)) {
        Some(Ok(())) => false,
        Some(Err(err)) => {
            warn!("Setting speed {} for train {} failed: {}", cmd.speed, cmd.train, err);
            false
        }
        None => true,
    });
}
