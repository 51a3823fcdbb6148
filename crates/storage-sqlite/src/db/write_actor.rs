use std::any::Any;

use diesel::SqliteConnection;
use log::error;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use hearth_core::errors::{DatabaseError, Error, Result};

type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type AnyBox = Box<dyn Any + Send + 'static>;

/// Handle for sending jobs to the writer task.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job<AnyBox>, oneshot::Sender<Result<AnyBox>>)>,
}

impl WriteHandle {
    /// Runs `job` on the writer's connection inside an immediate transaction.
    /// Any error returned by the job rolls the whole job back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (ret_tx, ret_rx) = oneshot::channel();
        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as AnyBox)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone("writer task has stopped"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_gone("writer task dropped the reply"))??;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| writer_gone("writer returned an unexpected type"))
    }
}

fn writer_gone(reason: &str) -> Error {
    Error::Database(DatabaseError::Internal(reason.to_string()))
}

/// Spawns the single writer. It holds one pooled connection for its whole
/// life and applies jobs one at a time, in arrival order.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(Job<AnyBox>, oneshot::Sender<Result<AnyBox>>)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer could not check out a connection: {}", e);
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<AnyBox> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(Error::from);
            // The caller may have gone away; nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
