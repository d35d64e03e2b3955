use crate::backend::{Backend, BackendError, BackendFuture, BackendResult};
use crate::common::TrainIndex;
use crate::layout::{Layout, LayoutError};
use crate::simulation::track::{SectionMap, TrackLoop};
use crate::simulation::train::Train;
use bevy::log::{debug, info, warn};
use futures_lite::future;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub enum Command {
    SetSpeed(TrainIndex, i32),
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("cannot spawn simulation thread: {0}")]
    Spawn(#[from] io::Error),
}

type SharedPositions = Arc<Mutex<Vec<(f32, f32)>>>;

struct SimulationState {
    tick: Duration,
    receiver: Receiver<Command>,
    sections: SectionMap,
    trains: Vec<Train>,
    positions: SharedPositions,
}

impl SimulationState {
    fn new(init: ThreadInitState) -> Self {
        SimulationState {
            tick: init.tick,
            receiver: init.receiver,
            sections: SectionMap::default(),
            trains: init.trains,
            positions: init.positions,
        }
    }

    /// Applies a command, returns `false` once the simulation should stop.
    fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::SetSpeed(id, speed) => {
                match self.trains.get_mut(id) {
                    Some(train) => {
                        debug!("Train {} speed set to {}", id, speed);
                        train.set_speed(speed);
                    }
                    None => warn!("Speed command for unknown train {}", id),
                }
                true
            }
            Command::Shutdown => false,
        }
    }

    fn step(&mut self) {
        for train in &mut self.trains {
            train.advance(&mut self.sections);
        }
    }

    fn publish(&self) {
        let positions: Vec<(f32, f32)> = self.trains.iter().map(|t| t.position().into()).collect();
        match self.positions.lock() {
            Ok(mut shared) => *shared = positions,
            Err(_) => warn!("Position buffer is poisoned, skipping update"),
        }
    }

    fn simulate(&mut self) {
        self.publish();
        let mut next_tick = Instant::now() + self.tick;
        loop {
            let now = Instant::now();
            if now >= next_tick {
                self.step();
                self.publish();
                next_tick += self.tick;
                continue;
            }

            match self.receiver.recv_timeout(next_tick - now) {
                Ok(cmd) => {
                    if !self.apply(cmd) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("Shutting down simulation");
    }
}

struct ThreadInitState {
    tick: Duration,
    trains: Vec<Train>,
    receiver: Receiver<Command>,
    positions: SharedPositions,
}

/// Track simulation running on its own thread. Doubles as the application's backend.
pub struct Engine {
    sender: Sender<Command>,
    positions: SharedPositions,
    train_count: usize,
    thread: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn start(layout: &Layout) -> Result<Self, EngineError> {
        layout.validate()?;
        let trains: Vec<Train> = layout
            .loops
            .iter()
            .enumerate()
            .map(|(id, data)| Train::new(id, TrackLoop::from(data), data.greedy))
            .collect();
        let train_count = trains.len();
        let initial: Vec<(f32, f32)> = trains.iter().map(|t| t.position().into()).collect();
        let positions = Arc::new(Mutex::new(initial));

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let init = ThreadInitState {
            tick: Duration::from_millis(layout.tick_ms),
            trains,
            receiver: cmd_rx,
            positions: positions.clone(),
        };
        let thread = thread::Builder::new()
            .name("SimThread".into())
            .spawn(move || SimulationState::new(init).simulate())?;
        info!("Simulation started with {} trains, tick {} ms", train_count, layout.tick_ms);

        Ok(Engine {
            sender: cmd_tx,
            positions,
            train_count,
            thread: Some(thread),
        })
    }

    fn send_command(&self, cmd: Command) -> BackendResult<()> {
        self.sender.send(cmd).map_err(|_| BackendError::Disconnected)
    }

    pub fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            // the thread may already be gone, joining is enough then
            let _ = self.send_command(Command::Shutdown);
            if thread.join().is_err() {
                warn!("Simulation thread panicked");
            }
        }
    }

    fn snapshot(&self) -> BackendResult<Vec<(f32, f32)>> {
        self.positions
            .lock()
            .map(|positions| positions.clone())
            .map_err(|_| BackendError::Unavailable("position buffer is poisoned".into()))
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Backend for Engine {
    fn get_trains(&self) -> BackendFuture<Vec<(f32, f32)>> {
        Box::pin(future::ready(self.snapshot()))
    }

    fn set_train_speed(&self, train: TrainIndex, speed: i32) -> BackendFuture<()> {
        let result = if train < self.train_count {
            self.send_command(Command::SetSpeed(train, speed))
        } else {
            Err(BackendError::UnknownTrain(train))
        };
        Box::pin(future::ready(result))
    }
}
