//! Periodic expiry sweep.
//!
//! A fixed-interval loop snapshots every live room once per pass,
//! evaluates each against the expiry rules, and destroys the condemned
//! ones. Passes are single-flight: if a pass is still running when the
//! next tick fires, that tick is dropped outright — never queued — so a
//! slow store cannot pile up concurrent sweeps. One room failing to be
//! destroyed never stops the rest of the pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use tracing::{debug, warn};

use darkroom_room::{now_millis, RoomManager};
use darkroom_store::RoomStore;

/// Sweep loop settings.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between the start of consecutive passes.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// What one call to [`Sweeper::run_pass`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// The pass was dropped because another was still in flight.
    pub skipped: bool,
    pub evaluated: usize,
    pub destroyed: usize,
    pub failed: usize,
}

/// Evaluates and destroys expired rooms on a timer.
pub struct Sweeper<S> {
    rooms: Arc<RoomManager<S>>,
    config: SweepConfig,
    in_flight: AtomicBool,
}

impl<S: RoomStore> Sweeper<S> {
    pub fn new(rooms: Arc<RoomManager<S>>, config: SweepConfig) -> Self {
        Self {
            rooms,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Runs one pass now, unless one is already in flight.
    pub async fn run_pass(&self) -> SweepReport {
        if self.in_flight.swap(true, Ordering::Acquire) {
            debug!("sweep pass skipped, previous pass still running");
            return SweepReport {
                skipped: true,
                ..SweepReport::default()
            };
        }
        let report = self.sweep_once().await;
        self.in_flight.store(false, Ordering::Release);
        report
    }

    async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let snapshot = match self.rooms.store().snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "sweep pass could not read rooms");
                report.failed = 1;
                return report;
            }
        };

        let now = now_millis();
        for (code, record) in snapshot {
            report.evaluated += 1;
            let verdict = self.rooms.verdict(&record, now);
            if verdict.is_alive() {
                continue;
            }
            match self.rooms.destroy(&code).await {
                Ok(()) => {
                    debug!(room = %code, ?verdict, "sweep destroyed expired room");
                    report.destroyed += 1;
                }
                Err(error) => {
                    warn!(room = %code, %error, "sweep could not destroy room");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Starts the timer loop on the runtime. Ticks that fire while a
    /// pass runs are skipped at the timer level and again by the
    /// in-flight guard for passes started by hand.
    pub fn spawn(self: &Arc<Self>) -> SweepHandle {
        let (shutdown, mut stop) = watch::channel(false);
        let sweeper = Arc::clone(self);
        let period = sweeper.config.interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweeper.run_pass().await;
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("sweep loop stopped");
        });

        SweepHandle { shutdown, task }
    }
}

/// Handle to a running sweep loop.
pub struct SweepHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the loop to stop and waits for it to finish. A pass in
    /// flight completes before the loop exits.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
