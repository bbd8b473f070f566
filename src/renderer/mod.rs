//! Glyph rendering module
//!
//! Patterns record draw commands into a [`Frame`]; a [`Surface`] replays
//! them and the pixels are ordered-dithered in place.

pub mod background;
pub mod dither;
pub mod frame;
pub mod patterns;
pub mod pipeline;
pub mod surface;

pub use frame::{Composite, DrawCommand, Frame, TextAlign};
pub use pipeline::{FrameStats, RenderOptions, SceneRenderer};
pub use surface::{SoftwareSurface, Surface};
