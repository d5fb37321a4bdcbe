//! Host-side capabilities a menu controller drives: widgets, audio and video channels,
//! durable preference storage, time scale, and scene/lifecycle hooks.
//!
//! Everything here is a seam. The `headless` module implements every trait against a shared
//! journal; `storage` and (behind the `rodio` feature) `audio` ship real implementations.

pub mod audio;
pub mod headless;
pub mod lifecycle;
pub mod storage;
pub mod time;
pub mod video;
pub mod widgets;
