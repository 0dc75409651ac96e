//! Per-sample smoothing of the whole parameter snapshot.
//!
//! The host delivers raw targets once per block; each of the 18 values
//! ramps independently toward its target every sample so the modules
//! downstream never see a discontinuity.

use shared_dsp::SmoothedParam;

use crate::params::{AbyssParams, NUM_PARAMS};

/// Smoothing time constant, ~10 ms.
pub const RAMP_MS: f32 = 10.0;

/// One `SmoothedParam` per parameter, all sharing the same ramp.
pub struct ParamSmoother {
    params: [SmoothedParam; NUM_PARAMS],
}

impl ParamSmoother {
    pub fn new(initial: &AbyssParams, sample_rate: f32) -> Self {
        let values = initial.to_array();
        Self {
            params: std::array::from_fn(|i| SmoothedParam::new(values[i], RAMP_MS, sample_rate)),
        }
    }

    /// Snap every value to `target` immediately (prepare/reset).
    pub fn snap(&mut self, target: &AbyssParams) {
        for (p, v) in self.params.iter_mut().zip(target.to_array()) {
            p.reset(v);
        }
    }

    /// Install the block's raw targets.
    pub fn set_targets(&mut self, target: &AbyssParams) {
        for (p, v) in self.params.iter_mut().zip(target.to_array()) {
            p.set_target(v);
        }
    }

    /// Advance every ramp one sample and return the smoothed snapshot.
    #[inline]
    pub fn next(&mut self) -> AbyssParams {
        let values = std::array::from_fn(|i| self.params[i].next());
        AbyssParams::from_array(&values)
    }
}
