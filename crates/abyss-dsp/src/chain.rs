//! Per-sample routing and the stereo engine entry point.
//!
//! Signal chain per channel:
//!     dry -> conditioner -> (envelope side-tap) -> vanishing delay
//!         -> reverb(conditioned + delay * delayMix)
//!         -> wet = reverb * reverbMix + delay * delayMix
//!         -> DC block -> dry/wet blend
//!
//! The two channels are independent except that the right channel runs
//! with detuned delay time and drift to decorrelate the stereo image.

use crate::conditioner::ViolinConditioner;
use crate::dc::DcBlocker;
use crate::delay::{VanishingDelay, DEFAULT_SEED};
use crate::envelope::EnvelopeFollower;
use crate::params::{AbyssParams, ParamStore};
use crate::reverb::AbyssFdn;
use crate::smooth::ParamSmoother;

/// Right-channel offsets that decorrelate the stereo image.
const RIGHT_DELAY_SCALE: f32 = 1.07;
const RIGHT_DRIFT_SCALE: f32 = 1.15;

/// One channel's full processing stack.
struct ChannelStrip {
    conditioner: ViolinConditioner,
    envelope: EnvelopeFollower,
    delay: VanishingDelay,
    reverb: AbyssFdn,
    dc: DcBlocker,
    delay_scale: f32,
    drift_scale: f32,
}

impl ChannelStrip {
    fn new(sample_rate: f32, delay_scale: f32, drift_scale: f32) -> Self {
        Self {
            conditioner: ViolinConditioner::new(sample_rate),
            envelope: EnvelopeFollower::new(sample_rate),
            delay: VanishingDelay::with_seed(sample_rate, DEFAULT_SEED),
            reverb: AbyssFdn::new(sample_rate),
            dc: DcBlocker::new(),
            delay_scale,
            drift_scale,
        }
    }

    fn reset(&mut self) {
        self.conditioner.reset();
        self.envelope.reset();
        self.delay.reset();
        self.reverb.reset();
        self.dc.reset();
    }

    #[inline]
    fn process(&mut self, dry: f32, p: &AbyssParams) -> f32 {
        self.conditioner
            .set_params(p.piezo_correct, p.body_resonance, p.brightness);
        self.envelope.set_sensitivity(p.bow_sensitivity);
        self.reverb.set_params(
            p.reverb_decay,
            p.reverb_damp_high,
            p.reverb_damp_low,
            p.reverb_mod_depth,
            p.reverb_mod_rate,
            p.detune_amount,
        );
        self.delay.set_params(
            p.delay_time_ms * self.delay_scale,
            p.delay_feedback,
            p.vanish_rate,
            p.degrade_amount,
            p.drift_amount * self.drift_scale,
        );

        let conditioned = self.conditioner.process(dry);
        self.envelope.process(conditioned);

        let delay_out = self.delay.process(conditioned);
        let reverb_in = conditioned + delay_out * p.delay_mix;
        let reverb_out = self.reverb.process(reverb_in);

        let wet = reverb_out * p.reverb_mix + delay_out * p.delay_mix;
        let wet = self.dc.process(wet);

        dry * (1.0 - p.master_mix) + wet * p.master_mix
    }
}

/// Stereo AbyssVerb engine.
///
/// The host calls [`prepare`](Self::prepare) outside the audio thread,
/// then [`process_block`](Self::process_block) per callback; processing
/// never allocates or locks.
pub struct AbyssEngine {
    sample_rate: f32,
    max_block: usize,
    smoother: ParamSmoother,
    left: ChannelStrip,
    right: ChannelStrip,
}

impl AbyssEngine {
    pub fn new(sample_rate: f32, max_block: usize, params: &AbyssParams) -> Self {
        let initial = params.clamped();
        log::debug!("abyss engine prepared: sr={sample_rate} Hz, max_block={max_block}");
        Self {
            sample_rate,
            max_block,
            smoother: ParamSmoother::new(&initial, sample_rate),
            left: ChannelStrip::new(sample_rate, 1.0, 1.0),
            right: ChannelStrip::new(sample_rate, RIGHT_DELAY_SCALE, RIGHT_DRIFT_SCALE),
        }
    }

    /// Rebuild for a new sample-rate/block-size negotiation. All
    /// buffers are resized and every piece of state is reset; stale
    /// buffers are never reused across rates.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize, params: &AbyssParams) {
        *self = Self::new(sample_rate, max_block, params);
    }

    /// Zero all audio state without resizing buffers.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block(&self) -> usize {
        self.max_block
    }

    /// Current raw envelope levels `(left, right)` for modulation use.
    pub fn envelope_levels(&self) -> (f32, f32) {
        (self.left.envelope.current(), self.right.envelope.current())
    }

    /// Process one block in place. `raw` is this block's parameter
    /// snapshot; values outside their documented range are clamped.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32], raw: &AbyssParams) {
        self.smoother.set_targets(&raw.clamped());
        let n = left.len().min(right.len());
        for i in 0..n {
            let p = self.smoother.next();
            left[i] = self.left.process(left[i], &p);
            right[i] = self.right.process(right[i], &p);
        }
    }

    /// Process one block, snapshotting the shared atomic store once.
    pub fn process_store_block(&mut self, left: &mut [f32], right: &mut [f32], store: &ParamStore) {
        let snapshot = store.snapshot();
        self.process_block(left, right, &snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_input(n: usize) -> (Vec<f32>, Vec<f32>) {
        let l: Vec<f32> = (0..n).map(|i| (i as f32 * 0.11).sin() * 0.4).collect();
        let r: Vec<f32> = (0..n).map(|i| (i as f32 * 0.13).cos() * 0.4).collect();
        (l, r)
    }

    #[test]
    fn silence_in_silence_out() {
        let mut engine = AbyssEngine::new(44100.0, 512, &AbyssParams::default());
        let mut l = vec![0.0; 44100];
        let mut r = vec![0.0; 44100];
        engine.process_block(&mut l, &mut r, &AbyssParams::default());
        assert!(l.iter().chain(r.iter()).all(|&s| s == 0.0));
    }

    #[test]
    fn master_mix_zero_is_bit_exact_dry() {
        let mut params = AbyssParams::default();
        params.master_mix = 0.0;
        let mut engine = AbyssEngine::new(44100.0, 512, &params);

        let (dry_l, dry_r) = stereo_input(8192);
        let mut l = dry_l.clone();
        let mut r = dry_r.clone();
        for chunk in 0..(8192 / 512) {
            let range = chunk * 512..(chunk + 1) * 512;
            engine.process_block(&mut l[range.clone()], &mut r[range], &params);
        }
        assert_eq!(l, dry_l);
        assert_eq!(r, dry_r);
    }

    #[test]
    fn zero_mixes_leak_no_dry_into_wet() {
        // With reverbMix = delayMix = 0, the wet path carries nothing;
        // masterMix = 1 therefore yields silence.
        let mut params = AbyssParams::default();
        params.reverb_mix = 0.0;
        params.delay_mix = 0.0;
        params.master_mix = 1.0;
        let mut engine = AbyssEngine::new(44100.0, 512, &params);

        let (mut l, mut r) = stereo_input(4096);
        engine.process_block(&mut l, &mut r, &params);
        assert!(l.iter().chain(r.iter()).all(|&s| s == 0.0));
    }

    #[test]
    fn channels_decorrelate() {
        let mut params = AbyssParams::default();
        params.drift_amount = 5.0;
        let mut engine = AbyssEngine::new(44100.0, 512, &params);

        let n = 44100;
        let mono: Vec<f32> = (0..n).map(|i| (i as f32 * 0.07).sin() * 0.3).collect();
        let mut l = mono.clone();
        let mut r = mono;
        engine.process_block(&mut l, &mut r, &params);
        let diff: f32 = l.iter().zip(&r).map(|(a, b)| (a - b).abs()).sum();
        assert!(diff > 0.01, "identical input should still decorrelate");
    }

    #[test]
    fn output_finite_under_extreme_params() {
        let mut params = AbyssParams::default();
        params.reverb_decay = 30.0;
        params.delay_feedback = 0.95;
        params.reverb_mod_depth = 3.0;
        params.drift_amount = 10.0;
        params.degrade_amount = 1.0;
        params.master_mix = 1.0;
        let mut engine = AbyssEngine::new(44100.0, 512, &params);

        let (mut l, mut r) = stereo_input(44100 * 2);
        engine.process_block(&mut l, &mut r, &params);
        assert!(l.iter().chain(r.iter()).all(|s| s.is_finite()));
    }

    #[test]
    fn out_of_range_snapshot_is_clamped_not_propagated() {
        let mut params = AbyssParams::default();
        params.reverb_decay = -100.0;
        params.delay_time_ms = 1e9;
        params.master_mix = 7.0;
        let mut engine = AbyssEngine::new(44100.0, 512, &params);

        let (mut l, mut r) = stereo_input(8192);
        engine.process_block(&mut l, &mut r, &params);
        assert!(l.iter().chain(r.iter()).all(|s| s.is_finite()));
    }

    #[test]
    fn store_snapshot_drives_engine() {
        let store = ParamStore::default();
        store.set("master_mix", 0.0);
        let mut engine = AbyssEngine::new(44100.0, 512, &store.snapshot());

        let (dry_l, dry_r) = stereo_input(2048);
        let mut l = dry_l.clone();
        let mut r = dry_r.clone();
        engine.process_store_block(&mut l, &mut r, &store);
        assert_eq!(l, dry_l);
        assert_eq!(r, dry_r);
    }

    #[test]
    fn prepare_resets_between_runs() {
        let params = AbyssParams::default();
        let mut engine = AbyssEngine::new(44100.0, 512, &params);

        let (first_l, first_r) = stereo_input(22050);
        let mut l = first_l.clone();
        let mut r = first_r.clone();
        engine.process_block(&mut l, &mut r, &params);
        let run_a = (l, r);

        engine.prepare(44100.0, 512, &params);
        let mut l = first_l;
        let mut r = first_r;
        engine.process_block(&mut l, &mut r, &params);
        assert_eq!((l, r), run_a, "full re-prepare must restore identical state");
    }

    #[test]
    fn envelope_is_queryable() {
        let params = AbyssParams::default();
        let mut engine = AbyssEngine::new(44100.0, 512, &params);
        assert_eq!(engine.envelope_levels(), (0.0, 0.0));

        let (mut l, mut r) = stereo_input(4096);
        engine.process_block(&mut l, &mut r, &params);
        let (env_l, env_r) = engine.envelope_levels();
        assert!(env_l > 0.0 && env_r > 0.0);
    }
}
