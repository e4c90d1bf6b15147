//! Alert distribution hub
//!
//! Fans detection alerts out from producers (monitoring sessions, manual
//! test triggers) to subscribers (SSE connections, recorders).
//!
//! The hub is a command channel feeding a single delivery task. Producers
//! call [`AlertHub::publish`] from any context, async or not; the call
//! enqueues and never blocks. The delivery task is the only owner of the
//! subscriber map, so registration, removal, and delivery never race. Each
//! subscriber gets a private bounded queue; a subscriber that has gone away
//! or stopped draining is removed on the next delivery attempt.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::events::Alert;

/// Default per-subscriber queue depth
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

enum HubCommand {
    Publish(Alert),
    Subscribe { id: Uuid, tx: mpsc::Sender<Alert> },
    Unsubscribe(Uuid),
}

/// Handle to the alert hub
///
/// Cheap to clone; all clones feed the same delivery task. Must be created
/// on a tokio runtime (the delivery task is spawned from `new`).
///
/// # Examples
///
/// ```no_run
/// use vsd_common::events::Alert;
/// use vsd_common::hub::AlertHub;
///
/// # async fn demo() {
/// let hub = AlertHub::new(64);
/// let mut sub = hub.subscribe();
///
/// hub.publish(Alert {
///     session_id: "device-001".to_string(),
///     category: "smoking".to_string(),
///     max_confidence: 0.91,
///     timestamp: chrono::Utc::now(),
///     screenshot_path: None,
/// });
///
/// let alert = sub.recv().await;
/// # let _ = alert;
/// # }
/// ```
#[derive(Clone)]
pub struct AlertHub {
    tx: mpsc::UnboundedSender<HubCommand>,
    queue_depth: usize,
    subscriber_count: Arc<AtomicUsize>,
}

impl AlertHub {
    /// Create a hub and spawn its delivery task on the current runtime
    ///
    /// `queue_depth` bounds each subscriber's private queue. A subscriber
    /// that falls this many alerts behind is treated as stale and removed.
    pub fn new(queue_depth: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriber_count = Arc::new(AtomicUsize::new(0));
        tokio::spawn(delivery_loop(rx, Arc::clone(&subscriber_count)));
        Self {
            tx,
            queue_depth,
            subscriber_count,
        }
    }

    /// Publish an alert to all current subscribers
    ///
    /// Callable from any thread; never blocks. Publishing when the delivery
    /// task is not running is a safe no-op.
    pub fn publish(&self, alert: Alert) {
        if self.tx.send(HubCommand::Publish(alert)).is_err() {
            debug!("alert hub not running; alert dropped");
        }
    }

    /// Register a subscriber and return its receiving handle
    ///
    /// Registration is processed before any alert published after this call
    /// from the same thread. The handle unregisters itself when dropped.
    pub fn subscribe(&self) -> AlertSubscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.queue_depth);
        if self.tx.send(HubCommand::Subscribe { id, tx }).is_err() {
            debug!(subscriber_id = %id, "alert hub not running; subscription stays empty");
        }
        AlertSubscription {
            id,
            hub_tx: self.tx.clone(),
            rx,
        }
    }

    /// Configured per-subscriber queue depth
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// Current number of registered subscribers
    ///
    /// Maintained by the delivery task; useful for logs and tests. Lags
    /// publish/subscribe calls until the delivery task has processed them.
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::Relaxed)
    }
}

/// Receiving side of a hub subscription
///
/// Dropping the handle unregisters the subscriber; the delivery task also
/// removes it on the next publish if the queue is found closed.
pub struct AlertSubscription {
    id: Uuid,
    hub_tx: mpsc::UnboundedSender<HubCommand>,
    rx: mpsc::Receiver<Alert>,
}

impl AlertSubscription {
    /// Subscriber id for log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Receive the next alert
    ///
    /// Returns `None` once the subscriber has been removed (stale) or the
    /// hub has shut down and the queue is drained.
    pub async fn recv(&mut self) -> Option<Alert> {
        self.rx.recv().await
    }

    /// Non-blocking receive, for drains and tests
    pub fn try_recv(&mut self) -> Option<Alert> {
        self.rx.try_recv().ok()
    }
}

impl Drop for AlertSubscription {
    fn drop(&mut self) {
        let _ = self.hub_tx.send(HubCommand::Unsubscribe(self.id));
    }
}

async fn delivery_loop(mut rx: mpsc::UnboundedReceiver<HubCommand>, count: Arc<AtomicUsize>) {
    let mut subscribers: HashMap<Uuid, mpsc::Sender<Alert>> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            HubCommand::Subscribe { id, tx } => {
                subscribers.insert(id, tx);
                count.store(subscribers.len(), Ordering::Relaxed);
                debug!(subscriber_id = %id, total = subscribers.len(), "alert subscriber registered");
            }
            HubCommand::Unsubscribe(id) => {
                if subscribers.remove(&id).is_some() {
                    count.store(subscribers.len(), Ordering::Relaxed);
                    debug!(subscriber_id = %id, total = subscribers.len(), "alert subscriber removed");
                }
            }
            HubCommand::Publish(alert) => {
                let mut stale: Vec<Uuid> = Vec::new();
                for (id, tx) in &subscribers {
                    match tx.try_send(alert.clone()) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            warn!(subscriber_id = %id, "alert subscriber queue full; removing");
                            stale.push(*id);
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            debug!(subscriber_id = %id, "alert subscriber gone; removing");
                            stale.push(*id);
                        }
                    }
                }
                for id in stale {
                    subscribers.remove(&id);
                }
                count.store(subscribers.len(), Ordering::Relaxed);
            }
        }
    }

    debug!("alert hub delivery task stopped");
}
