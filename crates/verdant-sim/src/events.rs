//! Event bus for notifying renderers and UIs of simulation changes.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use verdant_common::SpeciesId;

use crate::garden::PlotStage;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GardenEvent {
    /// A seed was planted
    Planted {
        /// Plot index
        plot: usize,
        /// Species planted
        species: SpeciesId,
    },
    /// A planting was watered and growth started
    Watered {
        /// Plot index
        plot: usize,
    },
    /// A plot's derived stage changed during a tick
    StageChanged {
        /// Plot index
        plot: usize,
        /// Stage before the tick
        from: PlotStage,
        /// Stage after the tick
        to: PlotStage,
    },
    /// A mature plot was harvested
    Harvested {
        /// Plot index
        plot: usize,
        /// Species harvested
        species: SpeciesId,
        /// Coins credited
        coins: u64,
        /// Experience awarded
        xp: u64,
    },
    /// The player reached a new level
    LeveledUp {
        /// The level reached
        level: u32,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GardenEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GardenEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GardenEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GardenEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GardenEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(GardenEvent::Watered { plot: 0 });
        bus.publish(GardenEvent::LeveledUp { level: 2 });

        assert_eq!(bus.pending_count(), 2);
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], GardenEvent::Watered { plot: 0 });
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(1);
        bus.publish(GardenEvent::Watered { plot: 0 });
        bus.publish(GardenEvent::Watered { plot: 1 });

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], GardenEvent::Watered { plot: 0 });
    }

    #[test]
    fn test_detached_sender() {
        let bus = EventBus::new(8);
        let sender = bus.sender();
        sender
            .try_send(GardenEvent::LeveledUp { level: 3 })
            .expect("send should succeed");

        assert_eq!(bus.drain().len(), 1);
    }
}
