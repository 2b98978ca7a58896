//! Player level and experience progression.
//!
//! Experience is tracked within the current level and rolls over on level-up.
//! The threshold for each level grows geometrically; a single large reward
//! can cross several thresholds at once.

use serde::{Deserialize, Serialize};

/// Base experience required to leave level 1.
const BASE_XP: f64 = 100.0;
/// Threshold growth factor per level.
const XP_GROWTH: f64 = 1.5;

/// Experience required to advance from the given level to the next.
#[must_use]
pub fn xp_for_next_level(level: u32) -> u64 {
    let exponent = level.saturating_sub(1);
    // Saturates at u64::MAX once the float exceeds the integer range.
    (BASE_XP * XP_GROWTH.powi(exponent.min(i32::MAX as u32) as i32)).floor() as u64
}

/// Player level and within-level experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    experience: u64,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

impl Progression {
    /// Creates a fresh progression at level 1 with no experience.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: 1,
            experience: 0,
        }
    }

    /// Restores progression from persisted parts.
    ///
    /// A persisted level of 0 is normalized to 1.
    #[must_use]
    pub fn from_parts(level: u32, experience: u64) -> Self {
        Self {
            level: level.max(1),
            experience,
        }
    }

    /// Returns the current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Returns experience accumulated within the current level.
    #[must_use]
    pub const fn experience(&self) -> u64 {
        self.experience
    }

    /// Returns experience still needed to reach the next level.
    #[must_use]
    pub fn xp_to_next_level(&self) -> u64 {
        xp_for_next_level(self.level).saturating_sub(self.experience)
    }

    /// Grants experience, applying as many level-ups as the total covers.
    ///
    /// Returns the number of levels gained.
    pub fn grant(&mut self, xp: u64) -> u32 {
        self.experience = self.experience.saturating_add(xp);

        let mut gained = 0;
        loop {
            let threshold = xp_for_next_level(self.level);
            if self.experience < threshold {
                break;
            }
            self.experience -= threshold;
            self.level += 1;
            gained += 1;
        }
        gained
    }
}
