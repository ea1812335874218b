//! Outbox relay: moves recorded facts from the outbox to the event bus.
//!
//! An entry is marked published only after the bus accepted it, so a crash between the two steps
//! republishes it (at-least-once). Drains are serialised per relay.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::bus::{BusError, EventBus};
use crate::outbox::OutboxStorage;
use crate::store::StoreError;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("outbox storage: {0}")]
    Store(#[from] StoreError),
    #[error("publish: {0}")]
    Bus(#[from] BusError),
}

/// Wakes a running relay. Kicks are not lost if the relay is busy; they coalesce into one pass.
#[derive(Clone, Default)]
pub struct RelayTrigger {
    notify: Arc<Notify>,
}

impl RelayTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kick(&self) {
        self.notify.notify_one();
    }

    async fn kicked(&self) {
        self.notify.notified().await;
    }
}

pub struct OutboxRelay {
    outbox: Arc<dyn OutboxStorage>,
    bus: Arc<dyn EventBus>,
    batch_size: usize,
    interval: Duration,
    trigger: RelayTrigger,
    draining: Mutex<()>,
}

impl OutboxRelay {
    pub fn new(outbox: Arc<dyn OutboxStorage>, bus: Arc<dyn EventBus>) -> Self {
        Self {
            outbox,
            bus,
            batch_size: DEFAULT_BATCH_SIZE,
            interval: DEFAULT_INTERVAL,
            trigger: RelayTrigger::new(),
            draining: Mutex::new(()),
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Poll interval of [`run`](Self::run) between kicks.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Handle to wake [`run`](Self::run) right after a commit.
    pub fn trigger(&self) -> RelayTrigger {
        self.trigger.clone()
    }

    /// Publish everything pending. Returns the number of messages published.
    /// Stops at the first publish failure and leaves that message and the rest pending.
    pub async fn drain(&self) -> Result<usize, RelayError> {
        let _pass = self.draining.lock().await;
        let mut published = 0;
        loop {
            let batch = self.outbox.fetch_pending(self.batch_size).await?;
            let last_batch = batch.len() < self.batch_size;
            for message in &batch {
                if let Err(e) = self.bus.publish(message).await {
                    warn!(
                        outbox_id = message.id,
                        event_type = %message.event_type,
                        error = %e,
                        "publish failed, message stays pending"
                    );
                    return Err(e.into());
                }
                self.outbox.mark_published(&[message.id]).await?;
                published += 1;
            }
            if last_batch {
                return Ok(published);
            }
        }
    }

    /// Drain on every kick and every poll interval until `shutdown` completes.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
                _ = self.trigger.kicked() => {}
            }
            match self.drain().await {
                Ok(0) => {}
                Ok(n) => debug!(published = n, "outbox drained"),
                Err(e) => warn!(error = %e, "outbox relay pass failed"),
            }
        }
        debug!("outbox relay stopped");
    }
}
