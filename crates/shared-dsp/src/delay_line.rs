//! Fixed-size circular delay line with fractional-delay readout.
//!
//! Length is fixed at construction; the audio thread only reads,
//! writes, and advances the cursor.

/// Circular buffer of samples plus a write cursor.
pub struct DelayLine {
    data: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Create a delay line of `len` samples, zeroed.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "delay line must have at least one sample");
        Self {
            data: vec![0.0; len],
            write_pos: 0,
        }
    }

    /// Create a delay line sized for `duration_secs` at `sample_rate`.
    pub fn with_duration(duration_secs: f32, sample_rate: f32) -> Self {
        Self::new((duration_secs * sample_rate).max(1.0) as usize)
    }

    /// Buffer length in samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read `delay` samples behind the write cursor with linear
    /// interpolation. The position wraps into `[0, len)`, so a delay
    /// larger than the buffer aliases rather than reading out of bounds.
    #[inline]
    pub fn read_frac(&self, delay: f32) -> f32 {
        let len = self.data.len();
        let pos = (self.write_pos as f32 - delay).rem_euclid(len as f32);
        let idx0 = (pos as usize) % len;
        let idx1 = (idx0 + 1) % len;
        let frac = pos - pos.floor();
        self.data[idx0] * (1.0 - frac) + self.data[idx1] * frac
    }

    /// Write one sample at the cursor and advance.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.data[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.data.len();
    }

    /// Zero the buffer and rewind the cursor. Length is unchanged.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.write_pos = 0;
    }
}
