//! Toolkit-side pixel buffers
//!
//! - [`ImageBuffer`]: format-tagged, stride-aware, copy-on-write pixel array
//! - [`Pixmap`]: display-ready wrapper that always holds a 32-bit buffer

pub mod image_buffer;
pub mod pixmap;

pub use image_buffer::ImageBuffer;
pub use pixmap::Pixmap;
