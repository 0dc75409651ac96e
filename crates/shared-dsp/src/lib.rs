//! Real-time DSP primitives shared across effect crates.
//!
//! Everything here is allocation-free after construction and safe to
//! call from an audio callback.

pub mod delay_line;
pub mod smoothing;

pub use delay_line::DelayLine;
pub use smoothing::SmoothedParam;
