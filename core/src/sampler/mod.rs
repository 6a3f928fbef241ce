//! Sampler state.
//!
//! Provides [`SamplerState`] for describing texture sampling parameters, along
//! with the composite [`TextureFilter`] and its per-axis [`FilterAxes`] view.

mod types;

pub use types::{FilterAxes, FilterAxis, SamplerState, TextureAddressMode, TextureFilter};
