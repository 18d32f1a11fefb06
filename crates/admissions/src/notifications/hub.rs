use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;

use super::{Notification, NotificationError, NotificationPublisher};

/// Buffered notifications per user before slow streams start lagging.
const CHANNEL_CAPACITY: usize = 32;

/// In-process registry of per-user broadcast channels.
#[derive(Default, Clone)]
pub struct NotificationHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Notification>>>>,
}

impl NotificationHub {
    pub fn subscribe(
        &self,
        user_id: &str,
    ) -> Result<broadcast::Receiver<Notification>, NotificationError> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| NotificationError::Transport("hub lock poisoned".to_string()))?;
        let sender = channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Ok(sender.subscribe())
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.channels
            .lock()
            .map(|channels| {
                channels
                    .get(user_id)
                    .map(broadcast::Sender::receiver_count)
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

impl NotificationPublisher for NotificationHub {
    /// Publishing to a user with no open stream is a no-op. Channels whose
    /// streams have all closed are dropped.
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| NotificationError::Transport("hub lock poisoned".to_string()))?;

        let user_id = notification.user_id.clone();
        if let Some(sender) = channels.get(&user_id) {
            if sender.send(notification).is_err() {
                channels.remove(&user_id);
                debug!(%user_id, "dropped notification channel without subscribers");
            }
        }
        Ok(())
    }
}
