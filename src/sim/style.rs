//! Style meter
//!
//! Fast movement fills the meter, idling drains it after a delay, and flashy
//! actions (airborne kills, wall-jump chains, slope launches) add bonuses.
//! Changes are reported as [`GameEvent::StyleChange`].

use serde::{Deserialize, Serialize};

use super::events::{EventSink, GameEvent};
use crate::tuning::StyleTuning;

/// Frame length the per-frame speed gain is tuned for
const REFERENCE_FRAME: f32 = 1.0 / 60.0;
/// Launch speed that earns exactly one launch bonus
const LAUNCH_REFERENCE_SPEED: f32 = 500.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleMeter {
    #[serde(skip)]
    tuning: StyleTuning,
    meter: f32,
    decay_timer: f32,
    wall_jump_chain: u32,
    wall_jump_timer: f32,
    last_tier: usize,
}

impl StyleMeter {
    pub fn new(tuning: &StyleTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            meter: 0.0,
            decay_timer: 0.0,
            wall_jump_chain: 0,
            wall_jump_timer: 0.0,
            last_tier: 0,
        }
    }

    pub fn value(&self) -> f32 {
        self.meter
    }

    pub fn wall_jump_chain(&self) -> u32 {
        self.wall_jump_chain
    }

    fn tier_index(&self) -> usize {
        self.tuning
            .tier_thresholds
            .iter()
            .rposition(|t| self.meter >= *t)
            .unwrap_or(0)
    }

    pub fn tier(&self) -> &str {
        self.tuning
            .tier_names
            .get(self.tier_index())
            .map(String::as_str)
            .unwrap_or("D")
    }

    pub fn multiplier(&self) -> f32 {
        self.tuning
            .tier_multipliers
            .get(self.tier_index())
            .copied()
            .unwrap_or(1.0)
    }

    /// Per-frame update with the player's current speed
    pub fn update(&mut self, dt: f32, player_speed: f32, events: &mut dyn EventSink) {
        let mut gained = false;
        let before = self.meter;

        if player_speed > self.tuning.speed_threshold {
            self.meter += self.tuning.speed_gain * (dt / REFERENCE_FRAME);
            gained = true;
        }

        if self.wall_jump_chain > 0 {
            self.wall_jump_timer += dt;
            if self.wall_jump_timer > self.tuning.wall_jump_chain_window {
                self.wall_jump_chain = 0;
                self.wall_jump_timer = 0.0;
            }
        }

        if gained {
            self.decay_timer = 0.0;
        } else {
            self.decay_timer += dt;
            if self.decay_timer > self.tuning.decay_delay {
                self.meter -= self.tuning.decay_rate * dt;
            }
        }

        self.meter = self.meter.clamp(0.0, self.tuning.max_meter);
        self.notify(before, events);
    }

    pub fn add_style(&mut self, amount: f32, events: &mut dyn EventSink) {
        let before = self.meter;
        self.meter = (self.meter + amount).clamp(0.0, self.tuning.max_meter);
        self.decay_timer = 0.0;
        self.notify(before, events);
    }

    pub fn on_airborne_kill(&mut self, events: &mut dyn EventSink) {
        self.add_style(self.tuning.airborne_kill_bonus, events);
    }

    pub fn on_multi_kill(&mut self, count: u32, events: &mut dyn EventSink) {
        self.add_style(self.tuning.multi_kill_bonus * count as f32, events);
    }

    /// Each wall jump in a chain is worth more than the last
    pub fn on_wall_jump(&mut self, events: &mut dyn EventSink) {
        self.wall_jump_chain += 1;
        self.wall_jump_timer = 0.0;
        self.add_style(self.tuning.wall_jump_chain_bonus * self.wall_jump_chain as f32, events);
    }

    pub fn on_slope_launch(&mut self, speed: f32, events: &mut dyn EventSink) {
        self.add_style(self.tuning.slope_launch_bonus * (speed / LAUNCH_REFERENCE_SPEED), events);
    }

    fn notify(&mut self, before: f32, events: &mut dyn EventSink) {
        let tier = self.tier_index();
        if self.meter != before || tier != self.last_tier {
            self.last_tier = tier;
            events.emit(GameEvent::StyleChange {
                meter: self.meter,
                tier: self.tier().to_string(),
                multiplier: self.multiplier(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::events::EventQueue;

    fn meter() -> StyleMeter {
        StyleMeter::new(&StyleTuning::default())
    }

    #[test]
    fn test_speed_gain_and_clamp() {
        let mut style = meter();
        let mut events = EventQueue::new();
        for _ in 0..60 {
            style.update(SIM_DT, 400.0, &mut events);
        }
        assert!((style.value() - 30.0).abs() < 0.1);
        assert_eq!(style.tier(), "C");
        assert_eq!(style.multiplier(), 1.2);
        assert_eq!(events.len(), 60);

        for _ in 0..1000 {
            style.update(SIM_DT, 400.0, &mut events);
        }
        assert_eq!(style.value(), 100.0);
        assert_eq!(style.tier(), "SSS");
    }

    #[test]
    fn test_decay_after_delay() {
        let mut style = meter();
        let mut events = EventQueue::new();
        style.add_style(50.0, &mut events);
        // Within the delay nothing drains
        for _ in 0..60 {
            style.update(SIM_DT, 0.0, &mut events);
        }
        assert_eq!(style.value(), 50.0);
        // One more second past the delay drains ~decay_rate
        for _ in 0..90 {
            style.update(SIM_DT, 0.0, &mut events);
        }
        assert!(style.value() < 50.0 && style.value() > 35.0);
    }

    #[test]
    fn test_wall_jump_chain_escalates_and_expires() {
        let mut style = meter();
        let mut events = EventQueue::new();
        style.on_wall_jump(&mut events);
        style.on_wall_jump(&mut events);
        assert_eq!(style.value(), 3.0 + 6.0);
        assert_eq!(style.wall_jump_chain(), 2);
        for _ in 0..130 {
            style.update(SIM_DT, 0.0, &mut events);
        }
        assert_eq!(style.wall_jump_chain(), 0);
    }

    #[test]
    fn test_launch_bonus_scales_with_speed() {
        let mut style = meter();
        let mut events = EventQueue::new();
        style.on_slope_launch(1000.0, &mut events);
        assert!((style.value() - 16.0).abs() < 1e-4);
        assert!(matches!(events.drain().last(), Some(GameEvent::StyleChange { .. })));
    }

    #[test]
    fn test_no_event_when_unchanged() {
        let mut style = meter();
        let mut events = EventQueue::new();
        style.update(SIM_DT, 0.0, &mut events);
        assert!(events.is_empty());
    }
}
