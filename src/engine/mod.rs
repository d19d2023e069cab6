//! Audio-reactive visualisation engine.
//!
//! Three components, leaf to root: [`FrameClock`] supplies clamped per-frame
//! delta-time, [`BarField`] owns the smoothing/decay/peak-cap state for the
//! bars, and the level producers in [`levels`] turn analyser bytes (or the
//! synthetic signal) into raw per-bar targets. The pixel pipeline that paints
//! the result lives in `crate::render`.

mod bars;
mod clock;
pub mod levels;

pub use bars::BarField;
pub use clock::FrameClock;
pub use levels::{bars_from_magnitudes, SyntheticLevels};
