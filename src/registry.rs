use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::classifier::GestureId;
use crate::landmarks::{Handedness, Point3};

/// A confirmed gesture, delivered to every subscriber of `gesture_id`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub gesture_id: GestureId,
    pub handedness: Handedness,
    /// Mean landmark position of the hand in the confirming frame.
    pub average_position: Point3,
    /// Timestamp of the confirming frame.
    pub time_ns: i64,
}

/// Receiver of gesture events.
pub trait GestureSubscriber: Send + Sync {
    fn on_gesture(&self, event: &GestureEvent);
}

/// Identity of a registered subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubscriberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SubscriberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Multimap from gesture id to the subscribers interested in it.
#[derive(Default)]
pub struct GestureRegistry {
    gesture_to_subscribers: HashMap<GestureId, HashSet<SubscriberId>>,
    subscribers: HashMap<SubscriberId, Arc<dyn GestureSubscriber>>,
}

impl GestureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `subscriber` to every id in `gesture_ids`.
    ///
    /// Registering the same (gesture, subscriber) pair twice has no extra
    /// effect. Re-registering an id with a new handler replaces the handler.
    pub fn register<I>(
        &mut self,
        gesture_ids: I,
        id: impl Into<SubscriberId>,
        subscriber: Arc<dyn GestureSubscriber>,
    ) where
        I: IntoIterator<Item = GestureId>,
    {
        let id = id.into();
        for gesture_id in gesture_ids {
            log::debug!("adding gesture {} to subscriber {}", gesture_id, id);
            self.gesture_to_subscribers
                .entry(gesture_id)
                .or_default()
                .insert(id.clone());
        }
        self.subscribers.insert(id, subscriber);
    }

    /// Removes a subscriber from every gesture, returning whether it was known.
    pub fn unregister(&mut self, id: &SubscriberId) -> bool {
        self.gesture_to_subscribers.retain(|_, set| {
            set.remove(id);
            !set.is_empty()
        });
        self.subscribers.remove(id).is_some()
    }

    /// Handlers bound to `gesture_id`, in no particular order.
    pub fn subscribers_for(&self, gesture_id: GestureId) -> Vec<Arc<dyn GestureSubscriber>> {
        self.gesture_to_subscribers
            .get(&gesture_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.subscribers.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, gesture_id: GestureId, id: &SubscriberId) -> bool {
        self.gesture_to_subscribers
            .get(&gesture_id)
            .is_some_and(|ids| ids.contains(id))
    }

    /// Gesture ids with at least one subscriber, sorted.
    pub fn gesture_ids(&self) -> Vec<GestureId> {
        let mut ids: Vec<_> = self.gesture_to_subscribers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers `event` to every subscriber of its gesture id and returns the
    /// number of deliveries.
    pub fn dispatch(&self, event: &GestureEvent) -> usize {
        deliver(&self.subscribers_for(event.gesture_id), event)
    }
}

pub(crate) fn deliver(subscribers: &[Arc<dyn GestureSubscriber>], event: &GestureEvent) -> usize {
    for subscriber in subscribers {
        subscriber.on_gesture(event);
    }
    subscribers.len()
}

/// Forwards events into a channel.
pub struct ChannelSubscriber {
    sender: Sender<GestureEvent>,
}

impl ChannelSubscriber {
    pub fn new(sender: Sender<GestureEvent>) -> Self {
        Self { sender }
    }
}

impl GestureSubscriber for ChannelSubscriber {
    fn on_gesture(&self, event: &GestureEvent) {
        if self.sender.send(*event).is_err() {
            log::debug!("gesture {} dropped, receiver gone", event.gesture_id);
        }
    }
}

/// Logs every event it receives under a name.
pub struct LogSubscriber {
    name: String,
}

impl LogSubscriber {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl GestureSubscriber for LogSubscriber {
    fn on_gesture(&self, event: &GestureEvent) {
        log::info!(
            "{}: gesture {} from {} hand at ({:.3}, {:.3}, {:.3})",
            self.name,
            event.gesture_id,
            event.handedness,
            event.average_position.x,
            event.average_position.y,
            event.average_position.z
        );
    }
}
