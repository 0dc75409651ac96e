//! Abyss reverb — 8-line feedback delay network.
//!
//! Each line is a fixed circular buffer read at an LFO-modulated
//! fractional offset, mixed through the Hadamard-sign matrix, decayed
//! by an RT60-derived gain, and shaped by two cascaded one-pole dampers
//! (high band, then low band) before being written back. Detune scales
//! the LFO rate per line so higher lines drift further apart.

use shared_dsp::DelayLine;
use std::f32::consts::TAU;

use crate::matrix::hadamard_sign;

pub const NUM_LINES: usize = 8;

/// Line lengths in samples at 44.1 kHz, rescaled at prepare.
const BASE_LENGTHS: [usize; NUM_LINES] = [1557, 1617, 1491, 1422, 1277, 1356, 1188, 1116];

/// Floor for the decay parameter; keeps the RT60 gain finite and < 1.
const MIN_DECAY_SECS: f32 = 0.1;

pub struct AbyssFdn {
    sample_rate: f32,
    lines: [DelayLine; NUM_LINES],
    damp1: [f32; NUM_LINES],
    damp2: [f32; NUM_LINES],
    lfo_phase: [f32; NUM_LINES],
    matrix: Vec<f32>,

    decay: f32,
    damp_high: f32,
    damp_low: f32,
    mod_depth_ms: f32,
    mod_rate_hz: f32,
    detune: f32,
}

impl AbyssFdn {
    pub fn new(sample_rate: f32) -> Self {
        let lines = std::array::from_fn(|i| {
            let len = (BASE_LENGTHS[i] as f32 * (sample_rate / 44100.0)) as usize;
            DelayLine::new(len.max(1))
        });
        Self {
            sample_rate,
            lines,
            damp1: [0.0; NUM_LINES],
            damp2: [0.0; NUM_LINES],
            lfo_phase: std::array::from_fn(|i| i as f32 / NUM_LINES as f32),
            matrix: hadamard_sign(NUM_LINES),
            decay: 6.0,
            damp_high: 0.7,
            damp_low: 0.3,
            mod_depth_ms: 0.5,
            mod_rate_hz: 0.3,
            detune: 0.0,
        }
    }

    pub fn set_params(
        &mut self,
        decay_secs: f32,
        damp_high: f32,
        damp_low: f32,
        mod_depth_ms: f32,
        mod_rate_hz: f32,
        detune: f32,
    ) {
        self.decay = decay_secs;
        self.damp_high = damp_high;
        self.damp_low = damp_low;
        self.mod_depth_ms = mod_depth_ms;
        self.mod_rate_hz = mod_rate_hz;
        self.detune = detune;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let scale = 1.0 / (NUM_LINES as f32).sqrt();

        // Modulated fractional reads.
        let mut reads = [0.0_f32; NUM_LINES];
        for i in 0..NUM_LINES {
            self.lfo_phase[i] +=
                self.mod_rate_hz * (1.0 + self.detune * i as f32 * 0.1) / self.sample_rate;
            if self.lfo_phase[i] >= 1.0 {
                self.lfo_phase[i] -= 1.0;
            }
            let lfo = (TAU * self.lfo_phase[i]).sin();
            let mod_samples = lfo * self.mod_depth_ms * (self.sample_rate / 1000.0);

            let len = self.lines[i].len() as f32;
            reads[i] = self.lines[i].read_frac(len - mod_samples);
        }

        // Hadamard-sign feedback mix (includes the 1/sqrt(8) scale).
        let mut mixed = [0.0_f32; NUM_LINES];
        for i in 0..NUM_LINES {
            let mut s = 0.0;
            for j in 0..NUM_LINES {
                s += self.matrix[i * NUM_LINES + j] * reads[j];
            }
            mixed[i] = s;
        }

        let decay = self.decay.max(MIN_DECAY_SECS);
        let mut output = 0.0;
        for i in 0..NUM_LINES {
            let len = self.lines[i].len() as f32;
            // Per-pass gain for a 60 dB drop over `decay` seconds.
            let g = 10.0_f32.powf(-3.0 * len / (decay * self.sample_rate));
            let sig = mixed[i] * g + input / NUM_LINES as f32;

            // High-band damping, then a gentler low-band stage.
            let kh = 1.0 - self.damp_high * 0.95;
            self.damp1[i] = sig * kh + self.damp1[i] * (1.0 - kh);
            let kl = 1.0 - self.damp_low * 0.5;
            let damped = self.damp1[i] * kl + self.damp2[i] * (1.0 - kl);
            self.damp2[i] = damped;

            self.lines[i].push(damped);
            output += reads[i];
        }

        output * scale
    }

    /// Zero all buffers, filter states, and LFO phases.
    pub fn reset(&mut self) {
        for line in self.lines.iter_mut() {
            line.clear();
        }
        self.damp1 = [0.0; NUM_LINES];
        self.damp2 = [0.0; NUM_LINES];
        self.lfo_phase = std::array::from_fn(|i| i as f32 / NUM_LINES as f32);
    }
}
