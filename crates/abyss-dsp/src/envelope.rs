//! Bow-dynamics envelope follower.
//!
//! Asymmetric one-pole tracker of the rectified signal: 1 ms attack,
//! 100 ms release. Informational tap for modulation routing; it does
//! not feed the audio path.

pub struct EnvelopeFollower {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
    sensitivity: f32,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            attack_coeff: (-1.0 / (sample_rate * 0.001)).exp(),
            release_coeff: (-1.0 / (sample_rate * 0.1)).exp(),
            envelope: 0.0,
            sensitivity: 0.5,
        }
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = rectified + (self.envelope - rectified) * coeff;
        self.envelope * (0.5 + self.sensitivity * 0.5)
    }

    /// Raw envelope, before sensitivity scaling.
    pub fn current(&self) -> f32 {
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
