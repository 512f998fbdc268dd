//! Fixed-interval tick loop

use crate::{EngineError, Result};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// One simulated hardware source.
///
/// `tick` computes a fresh value for every (metric, label set) pair it owns
/// and writes it into the registry it was built with. It runs to completion
/// without awaiting, so a scrape never observes a half-written instrument
/// cell. It must not fail.
pub trait Simulation: Send + 'static {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Run one update cycle
    fn tick(&mut self);
}

/// Spawns simulations onto the tokio runtime
pub struct SimulationRunner;

impl SimulationRunner {
    /// Start ticking `simulation` immediately, then once per `interval`.
    ///
    /// The loop checks for shutdown between ticks. Dropping the returned
    /// handle also ends the loop.
    pub fn spawn<S: Simulation>(mut simulation: S, interval: Duration) -> SimulationHandle<S> {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (ticks_tx, ticks_rx) = watch::channel(0u64);

        info!(
            "Starting simulation '{}' with {:?} tick interval",
            simulation.name(),
            interval
        );

        let task = tokio::spawn(async move {
            let mut ticks = 0u64;
            loop {
                simulation.tick();
                ticks += 1;
                ticks_tx.send_replace(ticks);
                debug!("Simulation '{}' completed tick {}", simulation.name(), ticks);

                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }

            info!("Simulation '{}' stopped after {} ticks", simulation.name(), ticks);
            simulation
        });

        SimulationHandle {
            shutdown_tx: Some(shutdown_tx),
            ticks_rx,
            task,
        }
    }
}

/// Handle to a running tick loop
#[derive(Debug)]
pub struct SimulationHandle<S> {
    shutdown_tx: Option<oneshot::Sender<()>>,
    ticks_rx: watch::Receiver<u64>,
    task: JoinHandle<S>,
}

impl<S> SimulationHandle<S> {
    /// Number of ticks completed so far
    pub fn ticks(&self) -> u64 {
        *self.ticks_rx.borrow()
    }

    /// Wait until at least `count` ticks have completed
    pub async fn wait_for_ticks(&self, count: u64) -> Result<()> {
        let mut rx = self.ticks_rx.clone();
        rx.wait_for(|ticks| *ticks >= count)
            .await
            .map_err(|_| EngineError::Task("simulation loop ended".to_string()))?;
        Ok(())
    }

    /// Stop the loop after the current tick and hand back the simulation
    pub async fn stop(mut self) -> Result<S> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        (&mut self.task)
            .await
            .map_err(|e| EngineError::Task(e.to_string()))
    }
}
