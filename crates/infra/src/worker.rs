use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Background worker that triggers generation runs on a fixed interval.
///
/// The trigger cadence is plumbing only; which cycle a run bills is decided
/// inside the run itself, so firing more often than once per cycle is safe.
#[derive(Debug)]
pub struct GenerationWorker;

impl GenerationWorker {
    /// Spawn a worker thread that invokes `run` every `interval`.
    ///
    /// A failed run is logged and retried on the next tick; `run` must
    /// therefore be safe to invoke again for the same cycle.
    pub fn spawn<F>(name: &'static str, interval: Duration, mut run: F) -> WorkerHandle
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, interval, shutdown_rx, &mut run))
            .expect("failed to spawn generation worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}

fn worker_loop<F>(
    name: &'static str,
    interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
    run: &mut F,
) where
    F: FnMut() -> anyhow::Result<()>,
{
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Err(err) = run() {
                    warn!(worker = name, error = ?err, "generation run failed");
                }
            }
        }
    }
}
