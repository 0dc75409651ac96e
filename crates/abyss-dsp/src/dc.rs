//! DC blocker for the wet path.
//!
//! `y[n] = x[n] - x[n-1] + R * y[n-1]` with R fixed at 0.995.

const R: f32 = 0.995;

#[derive(Default)]
pub struct DcBlocker {
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let y = input - self.x1 + R * self.y1;
        self.x1 = input;
        self.y1 = y;
        y
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
