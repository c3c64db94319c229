//! Caller-owned execution context.
//!
//! Platform services are free to reply from whatever thread they like. Work
//! that has to run where the caller lives is posted to a [`MainQueueHandle`]
//! and executed by whoever drives the matching [`MainQueue`].

use log::debug;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError, unbounded_channel};

use crate::error::{Error, Result};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct MainQueueHandle {
    tx: UnboundedSender<Job>,
}

pub struct MainQueue {
    rx: UnboundedReceiver<Job>,
}

#[must_use]
pub fn main_queue() -> (MainQueueHandle, MainQueue) {
    let (tx, rx) = unbounded_channel();

    (MainQueueHandle { tx }, MainQueue { rx })
}

impl MainQueueHandle {
    pub fn post<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(job)).map_err(|_| Error::MainQueueClosed)
    }
}

impl MainQueue {
    /// Waits for the next job and runs it on the current task.
    ///
    /// Returns `false` once every handle is gone and nothing is left to run.
    pub async fn turn(&mut self) -> bool {
        let Some(job) = self.rx.recv().await else {
            debug!("main queue closed");
            return false;
        };

        job();

        true
    }

    /// Runs every job that is already queued without waiting for more.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;

        loop {
            match self.rx.try_recv() {
                Ok(job) => {
                    job();
                    count += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        count
    }
}
