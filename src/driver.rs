//! Tick driver.
//!
//! A background task that advances a [`LimitEngine`] once per tick interval
//! against its host. Hosts with their own game loop call
//! [`LimitEngine::tick`] directly and never need this; it exists for
//! embedding the limiter in an async server and for the test-suite.
//!
//! The engine and host share one [`tokio::sync::Mutex`] inside a [`Shard`],
//! so event handlers and the tick never interleave.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::Instant;

use crate::host::Host;
use crate::limits::engine::LimitEngine;
use crate::metrics::EnforcementStats;

/// An engine paired with the host it enforces on.
pub struct Shard<H> {
    pub engine: LimitEngine,
    pub host: H,
}

impl<H: Host> Shard<H> {
    pub fn new(engine: LimitEngine, host: H) -> Self {
        Self { engine, host }
    }

    pub fn tick(&mut self) {
        self.engine.tick(&mut self.host);
    }
}

#[derive(Debug)]
pub enum DriverCommand {
    Snapshot(oneshot::Sender<DriverStats>),
    /// Stop ticking, flush the registry, then acknowledge.
    Shutdown(oneshot::Sender<()>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DriverStats {
    pub ticks: u64,
    pub pending_actions: usize,
    pub enforcement: EnforcementStats,
}

#[derive(Clone)]
pub struct DriverHandle {
    tx: mpsc::UnboundedSender<DriverCommand>,
}

impl DriverHandle {
    pub async fn snapshot(&self) -> Option<DriverStats> {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(DriverCommand::Snapshot(tx)).is_err() {
            return None;
        }
        rx.await.ok()
    }

    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(DriverCommand::Shutdown(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the tick loop. The loop ends on [`DriverHandle::shutdown`] or when
/// every handle has been dropped; both paths save the registry.
pub fn start_driver<H>(shard: Arc<Mutex<Shard<H>>>, tick: Duration) -> DriverHandle
where
    H: Host + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<DriverCommand>();
    let handle = DriverHandle { tx };

    info!("limiter driver started (tick {:?})", tick);
    tokio::spawn(async move {
        let mut ticks: u64 = 0;
        let mut next_tick = Instant::now() + tick;
        let mut last_stats_log = Instant::now();
        let done = loop {
            tokio::select! {
                cmd = rx.recv() => {
                    match cmd {
                        Some(DriverCommand::Snapshot(resp)) => {
                            let guard = shard.lock().await;
                            let _ = resp.send(DriverStats {
                                ticks,
                                pending_actions: guard.engine.queue().pending(),
                                enforcement: guard.engine.stats().clone(),
                            });
                        }
                        Some(DriverCommand::Shutdown(done)) => break Some(done),
                        None => break None,
                    }
                }
                _ = tokio::time::sleep_until(next_tick) => {
                    next_tick += tick;
                    ticks += 1;
                    let mut guard = shard.lock().await;
                    guard.tick();
                    if last_stats_log.elapsed() >= STATS_LOG_INTERVAL {
                        let stats = guard.engine.stats();
                        debug!(
                            "limiter stats: ticks={} allowed={} denied={} partial={} surfaced={} sweeps={} stale={}",
                            ticks,
                            stats.allowed,
                            stats.denied,
                            stats.partial_admits,
                            stats.units_surfaced,
                            stats.sweeps_run,
                            stats.stale_dropped
                        );
                        last_stats_log = Instant::now();
                    }
                }
            }
        };

        let mut guard = shard.lock().await;
        match guard.engine.shutdown() {
            Ok(()) => info!("limiter stopped after {} ticks; limits saved", ticks),
            Err(e) => warn!("limiter stopped after {} ticks; saving limits failed: {}", ticks, e),
        }
        drop(guard);
        if let Some(done) = done {
            let _ = done.send(());
        }
    });

    handle
}
