//! Runs the cycle on a fixed cadence on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::context::AppContext;
use crate::cycle::{run_active_cycle, CycleDeps, CycleOptions};
use crate::errors::AppError;

pub struct Scheduler;

pub struct SchedulerHandle {
    cancel: Arc<AtomicBool>,
    wake: Sender<()>,
    thread: Option<JoinHandle<usize>>,
}

impl Scheduler {
    /// Runs one cycle right away, then one every `interval` until stopped.
    pub fn start(ctx: AppContext, interval: Duration) -> Result<SchedulerHandle, AppError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (wake, sleeper) = mpsc::channel::<()>();
        let flag = Arc::clone(&cancel);

        let thread = std::thread::Builder::new()
            .name("price-scheduler".into())
            .spawn(move || {
                tracing::info!(interval_secs = interval.as_secs(), "scheduler started");
                let mut cycles = 0usize;

                loop {
                    let deps = CycleDeps::from_context(&ctx);
                    let opts = CycleOptions::from_context(&ctx);
                    if let Err(e) = run_active_cycle(deps, &opts, &flag) {
                        tracing::error!(error = %e, "scheduled cycle failed");
                    }
                    cycles += 1;

                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    match sleeper.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                tracing::info!(cycles, "scheduler stopped");
                cycles
            })
            .map_err(|e| AppError::Internal(format!("spawn scheduler failed: {e}")))?;

        Ok(SchedulerHandle {
            cancel,
            wake,
            thread: Some(thread),
        })
    }
}

impl SchedulerHandle {
    /// Lets the product in flight finish, then stops and joins the thread.
    /// Returns how many cycles ran.
    pub fn stop(mut self) -> usize {
        self.shutdown()
    }

    /// Blocks for the life of the scheduler thread. Used by the daemon, which
    /// runs until the process is killed.
    pub fn join(mut self) -> usize {
        match self.thread.take() {
            Some(t) => t.join().unwrap_or(0),
            None => 0,
        }
    }

    fn shutdown(&mut self) -> usize {
        self.cancel.store(true, Ordering::SeqCst);
        let _ = self.wake.send(());
        match self.thread.take() {
            Some(t) => t.join().unwrap_or_else(|_| {
                tracing::error!("scheduler thread panicked");
                0
            }),
            None => 0,
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown();
        }
    }
}
