//! Vanishing delay — 3 drifting, degrading taps over one shared buffer.
//!
//! Taps sit at golden-ratio spacings of the nominal delay time. Each
//! tap's gain is re-rolled by a seeded generator on a random timer
//! (vanish to zero, or return at a random level), slewed slowly to
//! avoid clicks. A slow sinusoidal drift wanders the read position,
//! and a "degrade" stage low-passes and bit-crushes the tap output.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared_dsp::DelayLine;
use std::f32::consts::TAU;

pub const NUM_TAPS: usize = 3;
pub const DEFAULT_SEED: u64 = 42;

/// Golden-ratio derived tap spacing.
const TAP_RATIOS: [f32; NUM_TAPS] = [1.0, 0.618, 0.382];

/// Shared buffer capacity in seconds.
const BUFFER_SECS: f32 = 2.0;

/// Per-sample slew toward the target gain.
const GAIN_SLEW: f32 = 0.001;

struct Tap {
    gain: f32,
    target_gain: f32,
    /// Samples until the next stochastic re-roll.
    timer: i32,
    drift_phase: f32,
    lp_state: f32,
}

impl Tap {
    fn new(index: usize) -> Self {
        Self {
            gain: 1.0,
            target_gain: 1.0,
            timer: 0,
            drift_phase: index as f32 * 0.33,
            lp_state: 0.0,
        }
    }
}

pub struct VanishingDelay {
    sample_rate: f32,
    buffer: DelayLine,
    taps: [Tap; NUM_TAPS],
    rng: ChaCha8Rng,
    seed: u64,

    delay_time_ms: f32,
    feedback: f32,
    vanish_rate: f32,
    degrade: f32,
    drift: f32,
}

impl VanishingDelay {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, DEFAULT_SEED)
    }

    /// Deterministic construction; two instances with the same seed and
    /// parameter sequence produce identical output.
    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        Self {
            sample_rate,
            buffer: DelayLine::with_duration(BUFFER_SECS, sample_rate),
            taps: std::array::from_fn(Tap::new),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            delay_time_ms: 400.0,
            feedback: 0.5,
            vanish_rate: 0.3,
            degrade: 0.3,
            drift: 2.0,
        }
    }

    pub fn set_params(
        &mut self,
        delay_time_ms: f32,
        feedback: f32,
        vanish_rate: f32,
        degrade: f32,
        drift: f32,
    ) {
        self.delay_time_ms = delay_time_ms;
        self.feedback = feedback;
        self.vanish_rate = vanish_rate;
        self.degrade = degrade;
        self.drift = drift;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let sr = self.sample_rate;
        let max_delay = (self.buffer.len() - 1) as f32;

        let mut output = 0.0;
        for (i, tap) in self.taps.iter_mut().enumerate() {
            // Stochastic vanish/return.
            tap.timer -= 1;
            if tap.timer <= 0 {
                let roll: f32 = self.rng.random();
                tap.target_gain = if roll < self.vanish_rate {
                    0.0
                } else {
                    self.rng.random::<f32>() * 0.7 + 0.3
                };
                tap.timer = self
                    .rng
                    .random_range((sr * 0.05) as i32..=(sr * 0.4) as i32);
            }
            tap.gain += (tap.target_gain - tap.gain) * GAIN_SLEW;

            // Slow timing drift.
            tap.drift_phase += self.drift * 0.1 / sr;
            if tap.drift_phase >= 1.0 {
                tap.drift_phase -= 1.0;
            }
            let drift_samples = (TAU * tap.drift_phase).sin() * self.drift * (sr / 1000.0);

            let delay_samples =
                (self.delay_time_ms * TAP_RATIOS[i] * (sr / 1000.0) + drift_samples)
                    .clamp(1.0, max_delay);
            let mut tap_out = self.buffer.read_frac(delay_samples);

            // Degrade: low-pass, then bit-depth reduction.
            let lp = 1.0 - self.degrade * 0.9;
            tap.lp_state = tap_out * (1.0 - lp) + tap.lp_state * lp;
            tap_out = tap.lp_state;
            if self.degrade > 0.01 {
                let bits = 16.0 - self.degrade * 12.0;
                let levels = 2.0_f32.powf(bits);
                tap_out = (tap_out * levels).round() / levels;
            }

            output += tap_out * tap.gain;
        }
        output /= NUM_TAPS as f32;

        self.buffer.push(input + output * self.feedback);
        output
    }

    /// Clear audio state and restart the generator from the seed.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.taps = std::array::from_fn(Tap::new);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}
