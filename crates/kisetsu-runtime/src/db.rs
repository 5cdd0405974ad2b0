use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use kisetsu_core::error::KisetsuError;
use kisetsu_core::models::{Collection, ExpandedSeasons};
use kisetsu_core::storage::{Snapshot, Storage};

use crate::RuntimeError;

/// Async handle to the storage, which lives on its own thread.
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    LoadSnapshot {
        reply: oneshot::Sender<Result<Snapshot, KisetsuError>>,
    },
    SaveSnapshot {
        collection: Collection,
        expanded: ExpandedSeasons,
        reply: oneshot::Sender<Result<(), KisetsuError>>,
    },
}

impl DbHandle {
    pub fn open(path: &Path) -> Result<Self, RuntimeError> {
        let storage = Storage::open(path).map_err(|e| {
            tracing::error!("Failed to open database: {e}");
            RuntimeError::Database(e.to_string())
        })?;
        Self::spawn(storage)
    }

    pub fn open_memory() -> Result<Self, RuntimeError> {
        let storage = Storage::open_memory().map_err(|e| RuntimeError::Database(e.to_string()))?;
        Self::spawn(storage)
    }

    fn spawn(storage: Storage) -> Result<Self, RuntimeError> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .map_err(|e| {
                tracing::error!("Failed to spawn DB thread: {e}");
                RuntimeError::Database(e.to_string())
            })?;

        Ok(Self { tx })
    }

    /// A handle whose actor has already stopped.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        Self { tx }
    }

    pub async fn load_snapshot(&self) -> Result<Snapshot, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::LoadSnapshot { reply });
        settle(rx.await)
    }

    pub async fn save_snapshot(
        &self,
        collection: Collection,
        expanded: ExpandedSeasons,
    ) -> Result<(), RuntimeError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::SaveSnapshot {
            collection,
            expanded,
            reply,
        });
        settle(rx.await)
    }
}

fn settle<T>(
    received: Result<Result<T, KisetsuError>, oneshot::error::RecvError>,
) -> Result<T, RuntimeError> {
    match received {
        Ok(result) => result.map_err(|e| RuntimeError::Database(e.to_string())),
        Err(_) => Err(RuntimeError::Database("DB actor closed".into())),
    }
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::LoadSnapshot { reply } => {
                let _ = reply.send(storage.load_snapshot());
            }
            DbCommand::SaveSnapshot {
                collection,
                expanded,
                reply,
            } => {
                let _ = reply.send(storage.save_snapshot(&collection, &expanded));
            }
        }
    }
    tracing::debug!("DB actor stopped");
}
