//! Background jobs polled from the GUI thread.
//!
//! Each job runs on its own thread with a current-thread tokio runtime and
//! reports a single result over a channel that the frame loop polls.

use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tokio::runtime::Builder;

pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T>>>,
}

impl<T> AsyncJob<T> {
    pub fn new(receiver: Receiver<Result<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Returns the result once, when the job has finished.
    pub fn poll(&mut self) -> Option<Result<T>> {
        let rx = self.receiver.as_ref()?;
        match rx.try_recv() {
            Ok(res) => {
                self.receiver = None;
                Some(res)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(Err(anyhow!("Worker task disconnected")))
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Run `builder()` to completion on a fresh thread.
pub fn spawn_job<T, FutBuilder, Fut>(builder: FutBuilder) -> AsyncJob<T>
where
    T: Send + 'static,
    FutBuilder: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(builder()),
            Err(e) => Err(anyhow!("Failed to create async runtime: {}", e)),
        };
        let _ = tx.send(result);
    });
    AsyncJob::new(rx)
}
