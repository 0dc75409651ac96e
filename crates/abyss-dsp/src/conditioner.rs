//! Violin input conditioning — piezo pickup correction.
//!
//! Three stages: a ~80 Hz one-pole high-pass subtracted from the input
//! (removes piezo sub-bass rumble), a peaking biquad at the ~300 Hz
//! violin body resonance, and a brightness gain. Filter coefficients
//! are fixed at prepare time; only the three mix amounts move with the
//! smoothed parameters.

use std::f32::consts::PI;

const BODY_FREQ_HZ: f32 = 300.0;
const BODY_Q: f32 = 2.0;
const BODY_GAIN_DB: f32 = 6.0;
const HP_FREQ_HZ: f32 = 80.0;

pub struct ViolinConditioner {
    hp_coeff: f32,
    hp_state: f32,

    // Peaking biquad, coefficients normalized by a0.
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,

    piezo_correct: f32,
    body_resonance: f32,
    brightness: f32,
}

impl ViolinConditioner {
    pub fn new(sample_rate: f32) -> Self {
        let hp_coeff = (-2.0 * PI * HP_FREQ_HZ / sample_rate).exp();

        // Standard peaking-EQ coefficients (RBJ cookbook).
        let omega = 2.0 * PI * BODY_FREQ_HZ / sample_rate;
        let alpha = omega.sin() / (2.0 * BODY_Q);
        let a = 10.0_f32.powf(BODY_GAIN_DB / 40.0);
        let a0 = 1.0 + alpha / a;

        Self {
            hp_coeff,
            hp_state: 0.0,
            b0: (1.0 + alpha * a) / a0,
            b1: -2.0 * omega.cos() / a0,
            b2: (1.0 - alpha * a) / a0,
            a1: -2.0 * omega.cos() / a0,
            a2: (1.0 - alpha / a) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            piezo_correct: 0.5,
            body_resonance: 0.5,
            brightness: 0.5,
        }
    }

    pub fn set_params(&mut self, piezo_correct: f32, body_resonance: f32, brightness: f32) {
        self.piezo_correct = piezo_correct;
        self.body_resonance = body_resonance;
        self.brightness = brightness;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        // High-pass removal, scaled by piezo_correct.
        self.hp_state = input * (1.0 - self.hp_coeff) + self.hp_state * self.hp_coeff;
        let corrected = input - self.hp_state * self.piezo_correct;

        // Body resonance biquad (canonical difference equation).
        let body = self.b0 * corrected + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = corrected;
        self.y2 = self.y1;
        self.y1 = body;
        // Guard against filter transients before mixing.
        let body = body.clamp(-10.0, 10.0);

        let blend = self.body_resonance * 0.5;
        let with_body = corrected * (1.0 - blend) + body * blend;

        let bright = with_body * (1.0 + self.brightness * 0.3);
        bright.clamp(-1.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.hp_state = 0.0;
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_in_silence_out() {
        let mut c = ViolinConditioner::new(44100.0);
        for _ in 0..1000 {
            assert_eq!(c.process(0.0), 0.0);
        }
    }

    #[test]
    fn output_stays_in_unit_range() {
        let mut c = ViolinConditioner::new(44100.0);
        c.set_params(1.0, 1.0, 1.0);
        for i in 0..10_000 {
            let x = ((i as f32) * 0.3).sin() * 5.0; // hot input
            let y = c.process(x);
            assert!((-1.0..=1.0).contains(&y), "y={y}");
        }
    }

    #[test]
    fn high_pass_removes_dc() {
        let mut c = ViolinConditioner::new(44100.0);
        c.set_params(1.0, 0.0, 0.0);
        let mut y = 0.0;
        for _ in 0..44100 {
            y = c.process(0.5);
        }
        // Full piezo correction subtracts the settled one-pole state.
        assert!(y.abs() < 0.01, "dc leak {y}");
    }

    #[test]
    fn body_resonance_boosts_300hz() {
        let sr = 44100.0;
        let freq = 300.0;
        let run = |body: f32| {
            let mut c = ViolinConditioner::new(sr);
            c.set_params(0.0, body, 0.0);
            let mut energy = 0.0;
            for i in 0..44100 {
                let x = (2.0 * PI * freq * i as f32 / sr).sin() * 0.1;
                let y = c.process(x);
                if i > 4410 {
                    energy += y * y;
                }
            }
            energy
        };
        assert!(run(1.0) > run(0.0) * 1.1, "resonance blend should boost 300 Hz");
    }

    #[test]
    fn brightness_raises_gain() {
        let mut dull = ViolinConditioner::new(44100.0);
        let mut bright = ViolinConditioner::new(44100.0);
        dull.set_params(0.0, 0.0, 0.0);
        bright.set_params(0.0, 0.0, 1.0);
        let y0 = dull.process(0.1);
        let y1 = bright.process(0.1);
        assert!((y1 - y0 * 1.3).abs() < 1e-6);
    }
}
