//! AbyssVerb signal-processing core.
//!
//! Stereo violin effect: piezo input conditioning, an 8-line feedback
//! delay network reverb, a 3-tap stochastic "vanishing" delay, and the
//! routing glue (parameter smoothing, DC blocking, dry/wet mix).
//!
//! The host collaborator owns parameter automation and persistence; it
//! hands this crate a snapshot of 18 ranged floats per block (directly
//! or through [`ParamStore`]) and a pair of channel buffers processed
//! in place. Everything past prepare is allocation- and lock-free.
//!
//! Entry point: [`AbyssEngine`].

pub mod chain;
pub mod conditioner;
pub mod dc;
pub mod delay;
pub mod envelope;
pub mod matrix;
pub mod params;
pub mod reverb;
pub mod smooth;

pub use chain::AbyssEngine;
pub use params::{AbyssParams, ParamStore};
