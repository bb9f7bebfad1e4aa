//! Game events
//!
//! Systems never broadcast globally. Anything that wants to notify a
//! collaborator (HUD, style scoring, audio) takes an [`EventSink`] and emits a
//! typed [`GameEvent`]. The default sink is an [`EventQueue`] the host drains
//! after each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::biome::BiomeKind;
use super::items::ItemId;
use super::platform::PlatformId;
use super::spawn::EnemyKind;

/// Events emitted by simulation for UI/audio feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player left a slope fast enough to be launched
    SlopeLaunch { speed: f32, angle: f32 },
    AltitudeChange { altitude: f32 },
    BiomeChange { biome: BiomeKind, name: String },
    HealthChange { health: i32, max_health: i32 },
    StyleChange { meter: f32, tier: String, multiplier: f32 },
    /// `direction` is the horizontal push away from the wall (-1 or 1)
    WallJump { direction: f32 },
    EnemyKilled { kind: EnemyKind, pos: Vec2, airborne: bool },
    PlayerDied { altitude: f32, kills: u32 },
    InventoryChange { items: Vec<ItemId> },
    PlatformBroken { id: PlatformId },
}

/// Receiver for simulation events
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Buffered sink, drained by the host once per frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Take all pending events in emission order
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventQueue {
    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order_and_drains() {
        let mut queue = EventQueue::new();
        queue.emit(GameEvent::AltitudeChange { altitude: 1.0 });
        queue.emit(GameEvent::SlopeLaunch { speed: 400.0, angle: -1.0 });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert!(matches!(drained[0], GameEvent::AltitudeChange { .. }));
        assert!(matches!(drained[1], GameEvent::SlopeLaunch { .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_serializes() {
        let json = serde_json::to_string(&GameEvent::WallJump { direction: 1.0 }).unwrap();
        assert!(json.contains("WallJump"));
    }
}
