use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// The thread that owns the connection. Closing the job queue ends it.
struct Worker {
    jobs: Option<mpsc::Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    fn submit(&self, job: Job) -> Result<()> {
        self.jobs
            .as_ref()
            .ok_or_else(|| anyhow!("label store is closed"))?
            .send(job)
            .map_err(|_| anyhow!("label store thread is not running"))
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Label store thread panicked");
            }
        }
    }
}

fn open_store(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open label store at {}", path.display()))?;

    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        warn!("WAL unavailable for {}: {err}", path.display());
    }
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    run_migrations(&mut conn).context("failed to migrate label store")?;

    Ok(conn)
}

/// Handle to the SQLite label store.
///
/// Clones share one connection living on its own thread. Queries are closures
/// queued to that thread; the async caller awaits the reply.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let path = db_path.clone();

        let thread = thread::Builder::new()
            .name("labelkit-db".into())
            .spawn(move || {
                let mut conn = match open_store(&path) {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                for job in jobs_rx {
                    job(&mut conn);
                }
                debug!("Label store thread stopped");
            })
            .context("failed to spawn label store thread")?;

        let worker = Worker {
            jobs: Some(jobs_tx),
            thread: Some(thread),
        };
        ready_rx
            .recv()
            .context("label store thread exited during startup")??;

        info!("Label store ready at {}", db_path.display());
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    /// Run `task` on the store thread.
    pub(crate) async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.worker.submit(Box::new(move |conn| {
            // The caller may have gone away; the work is done either way.
            let _ = reply_tx.send(task(conn));
        }))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("label store thread stopped before replying"))?
    }
}
