//! Household-scoped publish/subscribe for invalidating cached reads.

use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;
use tokio::sync::broadcast;

use super::{DomainEvent, DomainEventSink};

const DEFAULT_CAPACITY: usize = 64;

/// Fans out domain events to subscribers of the event's household only.
///
/// A household has a broadcast channel while it has at least one live
/// receiver. Channels left without receivers are removed on the next
/// `emit` to that household or the next `subscribe` to any household.
/// Events for households nobody listens to are dropped.
pub struct HouseholdEventHub {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<DomainEvent>>>,
}

impl Default for HouseholdEventHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HouseholdEventHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes to one household's events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self, household_id: &str) -> broadcast::Receiver<DomainEvent> {
        let mut channels = match self.channels.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        channels.retain(|_, tx| tx.receiver_count() > 0);
        channels
            .entry(household_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live subscribers for a household.
    pub fn subscriber_count(&self, household_id: &str) -> usize {
        self.channels
            .read()
            .ok()
            .and_then(|channels| channels.get(household_id).map(|tx| tx.receiver_count()))
            .unwrap_or(0)
    }

    /// Number of households that currently hold a channel.
    pub fn channel_count(&self) -> usize {
        self.channels.read().map(|channels| channels.len()).unwrap_or(0)
    }

    fn remove_if_unused(&self, household_id: &str) {
        let Ok(mut channels) = self.channels.write() else {
            return;
        };
        if channels
            .get(household_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(household_id);
            debug!("Dropped idle event channel for household {}", household_id);
        }
    }
}

impl DomainEventSink for HouseholdEventHub {
    fn emit(&self, event: DomainEvent) {
        let sender = self
            .channels
            .read()
            .ok()
            .and_then(|channels| channels.get(event.household_id()).cloned());
        match sender {
            Some(tx) if tx.receiver_count() > 0 => {
                // Lagging receivers are not waited for.
                let _ = tx.send(event);
            }
            Some(_) => self.remove_if_unused(event.household_id()),
            None => debug!("No subscribers for household {}", event.household_id()),
        }
    }
}
