//! Displayable pixmap
//!
//! A [`Pixmap`] is what a toolkit hands to its paint engine: an
//! [`ImageBuffer`] normalised to one of the two display formats,
//! `Argb32Premultiplied` when the source has alpha and `Rgb32` otherwise.

use tracing::warn;

use super::ImageBuffer;
use crate::model::PixelFormat;

/// Display-ready image
#[derive(Clone, Debug, Default)]
pub struct Pixmap {
    image: ImageBuffer,
}

impl Pixmap {
    /// Converts a buffer into a pixmap
    ///
    /// Buffers already in the display format are shared, not copied. A buffer
    /// that cannot be converted yields a null pixmap and a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixmat::{buffer::{ImageBuffer, Pixmap}, model::PixelFormat};
    ///
    /// let gray = ImageBuffer::from_packed(2, 1, PixelFormat::Grayscale8, &[0, 255]).unwrap();
    /// let pixmap = Pixmap::from_image(&gray);
    /// assert_eq!(pixmap.image().format(), PixelFormat::Rgb32);
    /// ```
    pub fn from_image(image: &ImageBuffer) -> Self {
        if image.is_null() {
            return Self::default();
        }
        let target = if image.format().has_alpha() {
            PixelFormat::Argb32Premultiplied
        } else {
            PixelFormat::Rgb32
        };
        match image.convert_to_format(target) {
            Ok(image) => Self { image },
            Err(e) => {
                warn!("Cannot build a pixmap from a {} buffer: {}", image.format(), e);
                Self::default()
            }
        }
    }

    /// Returns the pixmap contents as a buffer (shallow copy)
    pub fn to_image(&self) -> ImageBuffer {
        self.image.clone()
    }

    /// Borrow of the backing buffer
    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    /// Whether the pixmap holds no pixels
    pub fn is_null(&self) -> bool {
        self.image.is_null()
    }

    /// Returns the dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl From<ImageBuffer> for Pixmap {
    fn from(image: ImageBuffer) -> Self {
        Self::from_image(&image)
    }
}
