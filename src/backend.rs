use crate::common::TrainIndex;
use futures_lite::future;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("train {0} is not known to the backend")]
    UnknownTrain(TrainIndex),
    #[error("backend is disconnected")]
    Disconnected,
    #[error("backend state is unavailable: {0}")]
    Unavailable(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

pub type BackendFuture<T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'static>>;

/// Source of train positions and sink for speed commands.
///
/// Both calls are asynchronous and independent: callers may have several of them in flight,
/// and nothing orders their delivery.
pub trait Backend: Send + Sync + 'static {
    /// Current position of every train, indexed by train.
    fn get_trains(&self) -> BackendFuture<Vec<(f32, f32)>>;

    fn set_train_speed(&self, train: TrainIndex, speed: i32) -> BackendFuture<()>;
}

/// Stand-in used when no real backend could be started. Every call fails.
pub struct OfflineBackend;

impl Backend for OfflineBackend {
    fn get_trains(&self) -> BackendFuture<Vec<(f32, f32)>> {
        Box::pin(future::ready(Err(BackendError::Disconnected)))
    }

    fn set_train_speed(&self, _train: TrainIndex, _speed: i32) -> BackendFuture<()> {
        Box::pin(future::ready(Err(BackendError::Disconnected)))
    }
}
