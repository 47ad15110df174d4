/// Engine tuning constants and host-tunable limits.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Smallest shot delay (seconds) accepted when converting delays to rates.
    pub min_shot_delay: f32,
    /// Upper bound applied to the folded fire rate (shots per second).
    pub max_fire_rate: f32,
}

impl EngineConfig {
    // ===== compile-time constants =====
    /// Floor for any denominator used to invert a delay into a rate.
    pub const MIN_SHOT_DELAY: f32 = 0.001;
    /// Floor for folded fire rates, so `1 / rate` stays finite.
    pub const MIN_FIRE_RATE: f32 = 0.001;
    /// Floor for acceleration and deceleration times.
    pub const MIN_RAMP_TIME: f32 = 0.001;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_FIRE_RATE: f32 = 1000.0;

    pub fn new() -> Self {
        Self {
            min_shot_delay: Self::MIN_SHOT_DELAY,
            max_fire_rate: Self::DEFAULT_MAX_FIRE_RATE,
        }
    }

    pub fn with_max_fire_rate(max_fire_rate: f32) -> Self {
        Self {
            max_fire_rate,
            ..Self::new()
        }
    }

    /// Converts a shot delay into shots per second, guarding the denominator.
    pub fn fire_rate_from_delay(&self, shot_delay: f32) -> f32 {
        1.0 / shot_delay.max(self.min_shot_delay.max(Self::MIN_SHOT_DELAY))
    }

    /// Clamps a folded fire rate into the legal range.
    pub fn clamp_fire_rate(&self, rate: f32) -> f32 {
        rate.clamp(Self::MIN_FIRE_RATE, self.max_fire_rate.max(Self::MIN_FIRE_RATE))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
