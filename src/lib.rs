//! pixmat: pixel buffer <-> vision matrix bridge
//!
//! This library converts between a toolkit-style image buffer
//! ([`buffer::ImageBuffer`]) and a computer-vision style matrix
//! ([`mat::Mat`]) without corrupting or misaligning pixel data, and builds a
//! few conveniences on top of that mapping: Gaussian blur, an image wrapper
//! object, packaged resource loading and screen grabbing.

pub mod blur;
pub mod buffer;
pub mod capture;
pub mod config;
pub mod convert;
pub mod error;
pub mod image_mat;
pub mod mat;
pub mod model;
pub mod resource;
pub mod util;
