use crate::monitoring::domain::ports::{PeriodicTrigger, TriggerHandler};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// A `PeriodicTrigger` driven by the tokio timer.
///
/// At most one run is pending. The handler is held weakly, so a scheduler
/// that registers itself is not kept alive by its own trigger.
#[derive(Debug)]
pub struct TokioTrigger {
    next_run: watch::Sender<Option<Instant>>,
    handler: Mutex<Option<Weak<dyn TriggerHandler>>>,
}

impl Default for TokioTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokioTrigger {
    pub fn new() -> Self {
        let (next_run, _) = watch::channel(None);
        Self {
            next_run,
            handler: Mutex::new(None),
        }
    }

    /// When the next run is due, if one is pending.
    pub fn next_run(&self) -> Option<Instant> {
        *self.next_run.borrow()
    }

    fn handler(&self) -> Option<Arc<dyn TriggerHandler>> {
        self.handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    /// Fires pending runs until `shutdown` changes.
    ///
    /// Each run gets `execution_window` as its deadline. A run scheduled while
    /// another one executes waits for it to finish.
    pub async fn run(&self, execution_window: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut next_run = self.next_run.subscribe();
        loop {
            let due = *next_run.borrow_and_update();
            let wait = async {
                match due {
                    Some(at) => time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("trigger stopped");
                    break;
                }
                changed = next_run.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = wait => {
                    self.next_run.send_replace(None);
                    let Some(handler) = self.handler() else {
                        warn!("trigger fired without a registered handler");
                        continue;
                    };
                    let deadline = Instant::now() + execution_window;
                    let completion = handler.on_trigger(Some(deadline)).await;
                    debug!(completion = ?completion, "triggered run finished");
                }
            }
        }
    }
}

impl PeriodicTrigger for TokioTrigger {
    fn register(&self, handler: Arc<dyn TriggerHandler>) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::downgrade(&handler));
    }

    fn schedule_next(&self, after: Duration) {
        debug!(after = ?after, "next run scheduled");
        self.next_run.send_replace(Some(Instant::now() + after));
    }

    fn cancel(&self) {
        debug!("pending run cancelled");
        self.next_run.send_replace(None);
    }
}
