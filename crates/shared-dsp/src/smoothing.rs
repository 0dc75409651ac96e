//! Lock-free parameter smoothing for real-time audio.
//!
//! Provides an exponential ramp between current and target values,
//! avoiding zipper noise when parameters change at block rate.

/// Smoothed parameter with exponential ramp.
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// Coefficient per sample: `current = current + coeff * (target - current)`
    coeff: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter.
    ///
    /// `ramp_ms` — time to reach ~63% of target (one time constant).
    /// `sample_rate` — audio sample rate in Hz.
    pub fn new(initial: f32, ramp_ms: f32, sample_rate: f32) -> Self {
        let samples = (ramp_ms / 1000.0) * sample_rate;
        Self {
            current: initial,
            target: initial,
            coeff: 1.0 - (-1.0_f32 / samples).exp(),
        }
    }

    /// Set a new target value (called once per block).
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Get next smoothed value (called per sample from the audio thread).
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value without advancing the ramp.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Snap to a value immediately (e.g. on prepare/reset).
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    /// Check if smoothing is still active.
    pub fn is_smoothing(&self) -> bool {
        (self.current - self.target).abs() > 1e-8
    }

    /// Update ramp time (e.g. if sample rate changes).
    pub fn set_ramp(&mut self, ramp_ms: f32, sample_rate: f32) {
        let samples = (ramp_ms / 1000.0) * sample_rate;
        self.coeff = 1.0 - (-1.0_f32 / samples).exp();
    }
}
