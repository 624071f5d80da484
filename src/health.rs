//! Clamped hit-point tracking for one combatant.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Current/max HP with every update clamped into `[0, max]`. Reaching 0 is
/// terminal. Only turn resolution writes here; the renderer observes through
/// the store's changed/unchanged cycle, which is why the mutators report
/// whether the value actually moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HealthTracker {
    current: u16,
    max: u16,
}

impl HealthTracker {
    /// Starts full. A zero max is lifted to 1 to keep the invariant `max > 0`.
    pub fn new(max: u16) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    /// Sets `current = clamp(value, 0, max)`. Always succeeds; returns whether
    /// the stored value changed.
    pub fn update(&mut self, value: i32) -> bool {
        let clamped = value.clamp(0, i32::from(self.max)) as u16;
        if clamped == self.current {
            return false;
        }
        self.current = clamped;
        true
    }

    pub fn apply_damage(&mut self, amount: u16) -> bool {
        self.update(i32::from(self.current) - i32::from(amount))
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}
