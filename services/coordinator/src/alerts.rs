//! Alert fan-out to connected operators.
//!
//! Delivery is best effort. A listener only sees frames sent while it is
//! subscribed; a listener that falls more than the buffer behind loses the
//! overflow and keeps going. Nothing is persisted or replayed.

use std::sync::Arc;

use relief_events::{AlertEvent, InventoryNotice, PushFrame, Severity};
use relief_id::{CampId, ListenerId};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::store::CoordinationError;

/// Frames buffered per listener before the oldest are dropped.
pub const DEFAULT_BUFFER: usize = 64;

#[derive(Debug, Clone)]
struct Delivery {
    /// Listener that caused the frame; it is not echoed back.
    origin: Option<ListenerId>,
    frame: Arc<PushFrame>,
}

/// What a broadcast reached.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReceipt {
    pub event: AlertEvent,
    pub delivered_to: usize,
}

/// Process-owned pub/sub for alert frames.
///
/// Created at startup, injected through the application state and closed
/// at shutdown.
#[derive(Debug)]
pub struct AlertBroadcaster {
    tx: broadcast::Sender<Delivery>,
    closed: watch::Sender<bool>,
}

impl Default for AlertBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl AlertBroadcaster {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        let (closed, _) = watch::channel(false);
        Self { tx, closed }
    }

    /// Registers a listener. It receives only frames sent from now on.
    pub fn subscribe(&self) -> Subscription {
        let subscription = Subscription {
            id: ListenerId::new(),
            rx: self.tx.subscribe(),
            closed: self.closed.subscribe(),
        };
        info!(
            listener_id = %subscription.id,
            listeners = self.listener_count(),
            "Alert listener subscribed"
        );
        subscription
    }

    /// Drops a listener's registration.
    pub fn unsubscribe(&self, subscription: Subscription) {
        let id = subscription.id;
        drop(subscription);
        info!(listener_id = %id, listeners = self.listener_count(), "Alert listener unsubscribed");
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Sends an alert to every current listener.
    pub fn broadcast(
        &self,
        message: &str,
        severity: Severity,
    ) -> Result<BroadcastReceipt, CoordinationError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CoordinationError::validation(
                "message",
                "alert message cannot be empty",
            ));
        }

        let event = AlertEvent::now(message, severity);
        let delivered_to = self.publish(None, PushFrame::BroadcastAlert(event.clone()));
        info!(severity = %severity, delivered_to, "Alert broadcast");
        Ok(BroadcastReceipt {
            event,
            delivered_to,
        })
    }

    /// Relays a field-reported inventory change to every listener except
    /// `origin`. Returns how many listeners it reached.
    pub fn relay_inventory_change(
        &self,
        origin: ListenerId,
        camp_id: CampId,
        camp_name: &str,
        item: &str,
    ) -> usize {
        let notice = InventoryNotice::item_changed(camp_id, camp_name, item);
        // The origin still holds a receiver, so it is counted by the channel.
        let others = self
            .publish(Some(origin), PushFrame::InventoryAlert(notice))
            .saturating_sub(1);
        debug!(listener_id = %origin, camp_id = %camp_id, item, "Inventory change relayed");
        others
    }

    fn publish(&self, origin: Option<ListenerId>, frame: PushFrame) -> usize {
        if self.is_closed() {
            return 0;
        }
        let delivery = Delivery {
            origin,
            frame: Arc::new(frame),
        };
        // Err only means nobody is listening.
        self.tx.send(delivery).unwrap_or(0)
    }

    /// Ends every subscription. Later sends reach nobody.
    pub fn close(&self) {
        self.closed.send_replace(true);
        info!(listeners = self.listener_count(), "Alert broadcaster closed");
    }
}

/// One listener's view of the alert stream.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    rx: broadcast::Receiver<Delivery>,
    closed: watch::Receiver<bool>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Next frame for this listener; `None` once the broadcaster closes.
    pub async fn recv(&mut self) -> Option<Arc<PushFrame>> {
        let me = self.id;
        if *self.closed.borrow_and_update() {
            return None;
        }
        loop {
            tokio::select! {
                biased;
                _ = self.closed.changed() => return None,
                received = self.rx.recv() => match received {
                    Ok(delivery) if delivery.origin == Some(me) => continue,
                    Ok(delivery) => return Some(delivery.frame),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(listener_id = %me, missed, "Alert listener lagged; frames dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    }
}
