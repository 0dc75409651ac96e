//! Parameter schema for the AbyssVerb core.
//!
//! All callers (host wrapper, tests) use the same `AbyssParams` struct.
//! The host owns the values; this crate only reads one snapshot per
//! block and clamps it defensively into the documented ranges.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of user-facing parameters.
pub const NUM_PARAMS: usize = 18;

/// Parameter names, in snapshot order.
pub const PARAM_NAMES: [&str; NUM_PARAMS] = [
    "piezo_correct",
    "body_resonance",
    "brightness",
    "bow_sensitivity",
    "reverb_decay",
    "reverb_damp_high",
    "reverb_damp_low",
    "reverb_mod_depth",
    "reverb_mod_rate",
    "detune_amount",
    "delay_time_ms",
    "delay_feedback",
    "vanish_rate",
    "degrade_amount",
    "drift_amount",
    "reverb_mix",
    "delay_mix",
    "master_mix",
];

/// Documented `(min, max)` range for a parameter.
pub fn param_range(name: &str) -> Option<(f32, f32)> {
    match name {
        "piezo_correct" => Some((0.0, 1.0)),
        "body_resonance" => Some((0.0, 1.0)),
        "brightness" => Some((0.0, 1.0)),
        "bow_sensitivity" => Some((0.0, 1.0)),
        "reverb_decay" => Some((0.5, 30.0)),
        "reverb_damp_high" => Some((0.0, 0.95)),
        "reverb_damp_low" => Some((0.0, 0.8)),
        "reverb_mod_depth" => Some((0.0, 3.0)),
        "reverb_mod_rate" => Some((0.05, 2.0)),
        "detune_amount" => Some((0.0, 1.0)),
        "delay_time_ms" => Some((50.0, 1500.0)),
        "delay_feedback" => Some((0.0, 0.95)),
        "vanish_rate" => Some((0.0, 0.8)),
        "degrade_amount" => Some((0.0, 1.0)),
        "drift_amount" => Some((0.0, 10.0)),
        "reverb_mix" => Some((0.0, 1.0)),
        "delay_mix" => Some((0.0, 1.0)),
        "master_mix" => Some((0.0, 1.0)),
        _ => None,
    }
}

/// All AbyssVerb parameters.
///
/// Uses `#[serde(default)]` so sparse preset JSON loads correctly —
/// missing keys get default values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbyssParams {
    // --- Violin input conditioning ---
    pub piezo_correct: f32,
    pub body_resonance: f32,
    pub brightness: f32,
    pub bow_sensitivity: f32,

    // --- Abyss reverb ---
    /// RT60-like decay time in seconds.
    pub reverb_decay: f32,
    pub reverb_damp_high: f32,
    pub reverb_damp_low: f32,
    /// Delay-line modulation depth in milliseconds.
    pub reverb_mod_depth: f32,
    /// Modulation rate in Hz.
    pub reverb_mod_rate: f32,
    pub detune_amount: f32,

    // --- Vanishing delay ---
    pub delay_time_ms: f32,
    pub delay_feedback: f32,
    /// Probability that a tap vanishes when its timer fires.
    pub vanish_rate: f32,
    pub degrade_amount: f32,
    pub drift_amount: f32,

    // --- Mix ---
    pub reverb_mix: f32,
    pub delay_mix: f32,
    pub master_mix: f32,
}

impl Default for AbyssParams {
    fn default() -> Self {
        Self {
            piezo_correct: 0.5,
            body_resonance: 0.5,
            brightness: 0.5,
            bow_sensitivity: 0.5,

            reverb_decay: 6.0,
            reverb_damp_high: 0.7,
            reverb_damp_low: 0.3,
            reverb_mod_depth: 0.5,
            reverb_mod_rate: 0.3,
            detune_amount: 0.0,

            delay_time_ms: 400.0,
            delay_feedback: 0.5,
            vanish_rate: 0.3,
            degrade_amount: 0.3,
            drift_amount: 2.0,

            reverb_mix: 0.4,
            delay_mix: 0.3,
            master_mix: 0.5,
        }
    }
}

impl AbyssParams {
    /// Parse from JSON. Missing fields get default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Values in `PARAM_NAMES` order.
    pub fn to_array(&self) -> [f32; NUM_PARAMS] {
        [
            self.piezo_correct,
            self.body_resonance,
            self.brightness,
            self.bow_sensitivity,
            self.reverb_decay,
            self.reverb_damp_high,
            self.reverb_damp_low,
            self.reverb_mod_depth,
            self.reverb_mod_rate,
            self.detune_amount,
            self.delay_time_ms,
            self.delay_feedback,
            self.vanish_rate,
            self.degrade_amount,
            self.drift_amount,
            self.reverb_mix,
            self.delay_mix,
            self.master_mix,
        ]
    }

    /// Rebuild from `PARAM_NAMES`-ordered values.
    pub fn from_array(v: &[f32; NUM_PARAMS]) -> Self {
        Self {
            piezo_correct: v[0],
            body_resonance: v[1],
            brightness: v[2],
            bow_sensitivity: v[3],
            reverb_decay: v[4],
            reverb_damp_high: v[5],
            reverb_damp_low: v[6],
            reverb_mod_depth: v[7],
            reverb_mod_rate: v[8],
            detune_amount: v[9],
            delay_time_ms: v[10],
            delay_feedback: v[11],
            vanish_rate: v[12],
            degrade_amount: v[13],
            drift_amount: v[14],
            reverb_mix: v[15],
            delay_mix: v[16],
            master_mix: v[17],
        }
    }

    /// Copy with every value clamped into its documented range.
    /// Non-finite values fall back to the range minimum.
    pub fn clamped(&self) -> Self {
        let mut values = self.to_array();
        for (v, name) in values.iter_mut().zip(PARAM_NAMES) {
            if let Some((lo, hi)) = param_range(name) {
                *v = if v.is_finite() { v.clamp(lo, hi) } else { lo };
            }
        }
        Self::from_array(&values)
    }
}

/// Wait-free single-writer/single-reader parameter snapshot store.
///
/// The control thread writes individual values; the audio thread takes
/// one whole snapshot per block. Each value is an `f32` bit-cast into
/// an `AtomicU32`, so neither side ever blocks or tears.
pub struct ParamStore {
    bits: [AtomicU32; NUM_PARAMS],
}

impl ParamStore {
    pub fn new(initial: &AbyssParams) -> Self {
        let values = initial.to_array();
        Self {
            bits: std::array::from_fn(|i| AtomicU32::new(values[i].to_bits())),
        }
    }

    /// Set one parameter by name (control thread). Returns false for
    /// unknown names.
    pub fn set(&self, name: &str, value: f32) -> bool {
        match PARAM_NAMES.iter().position(|&n| n == name) {
            Some(i) => {
                self.bits[i].store(value.to_bits(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Overwrite every parameter (control thread).
    pub fn store(&self, params: &AbyssParams) {
        for (bits, value) in self.bits.iter().zip(params.to_array()) {
            bits.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    /// Read the current values (audio thread, once per block).
    pub fn snapshot(&self) -> AbyssParams {
        let values = std::array::from_fn(|i| f32::from_bits(self.bits[i].load(Ordering::Relaxed)));
        AbyssParams::from_array(&values)
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(&AbyssParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_table() {
        let p = AbyssParams::default();
        assert_eq!(p.reverb_decay, 6.0);
        assert_eq!(p.delay_time_ms, 400.0);
        assert_eq!(p.detune_amount, 0.0);
        assert_eq!(p.master_mix, 0.5);
    }

    #[test]
    fn every_default_is_in_range() {
        let p = AbyssParams::default();
        for (v, name) in p.to_array().iter().zip(PARAM_NAMES) {
            let (lo, hi) = param_range(name).unwrap();
            assert!(*v >= lo && *v <= hi, "{name} default {v} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn sparse_json_load() {
        let p = AbyssParams::from_json(r#"{"reverb_decay": 12.0, "master_mix": 1.0}"#).unwrap();
        assert_eq!(p.reverb_decay, 12.0);
        assert_eq!(p.master_mix, 1.0);
        assert_eq!(p.delay_time_ms, 400.0);
    }

    #[test]
    fn array_roundtrip() {
        let p = AbyssParams::default();
        assert_eq!(AbyssParams::from_array(&p.to_array()), p);
    }

    #[test]
    fn clamps_out_of_range_snapshot() {
        let mut p = AbyssParams::default();
        p.reverb_decay = -4.0;
        p.delay_feedback = 2.0;
        p.delay_time_ms = f32::NAN;
        let c = p.clamped();
        assert_eq!(c.reverb_decay, 0.5);
        assert_eq!(c.delay_feedback, 0.95);
        assert_eq!(c.delay_time_ms, 50.0);
    }

    #[test]
    fn store_snapshot_roundtrip() {
        let store = ParamStore::default();
        assert!(store.set("vanish_rate", 0.7));
        assert!(!store.set("no_such_param", 1.0));
        let snap = store.snapshot();
        assert_eq!(snap.vanish_rate, 0.7);
        assert_eq!(snap.reverb_decay, 6.0);

        let mut p = AbyssParams::default();
        p.drift_amount = 9.5;
        store.store(&p);
        assert_eq!(store.snapshot(), p);
    }
}
