//! Image wrapper holding a buffer and its matrix side by side
//!
//! [`ImageMat`] keeps an [`ImageBuffer`] together with the owned [`Mat`]
//! derived from it, so matrix operations can be chained on the wrapper and
//! the buffer is refreshed after each one.
//!
//! # Examples
//!
//! ```
//! use pixmat::{buffer::ImageBuffer, image_mat::ImageMat};
//!
//! let mut wrapper = ImageMat::from_image(ImageBuffer::from_test_pattern(64, 64));
//! wrapper.gaussian_blur(2).gaussian_blur(1);
//!
//! let pixmap = wrapper.to_pixmap();
//! assert_eq!(pixmap.dimensions(), (64, 64));
//! ```

use std::path::Path;

use tracing::warn;

use crate::{
    blur,
    buffer::{ImageBuffer, Pixmap},
    convert,
    error::BridgeError,
    mat::Mat,
    model::ContainerFormat,
};

/// Buffer plus derived matrix
#[derive(Clone, Debug, Default)]
pub struct ImageMat {
    image: ImageBuffer,
    mat:   Mat<'static>,
}

impl ImageMat {
    /// Null wrapper with an empty matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an image file
    ///
    /// With `format` the file is decoded as that container; otherwise the
    /// container is detected from the file contents. A file that cannot be
    /// read or decoded yields a null wrapper and a warning.
    pub fn open(path: impl AsRef<Path>, format: Option<ContainerFormat>) -> Self {
        let path = path.as_ref();
        let loaded = match format {
            Some(format) => std::fs::read(path)
                .map_err(BridgeError::from)
                .and_then(|bytes| ImageBuffer::from_encoded_as(&bytes, format)),
            None => ImageBuffer::load(path),
        };
        match loaded {
            Ok(image) => Self::from_image(image),
            Err(e) => {
                warn!("Cannot open {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Wraps a buffer and derives its matrix
    ///
    /// Unsupported formats keep the buffer but leave the matrix empty.
    pub fn from_image(image: ImageBuffer) -> Self {
        let mat = convert::image_to_mat(&image).into_owned();
        Self { image, mat }
    }

    /// Copy of the derived matrix
    pub fn mat(&self) -> Mat<'static> {
        self.mat.clone_owned()
    }

    /// The wrapped buffer
    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    /// Unwraps the buffer
    pub fn into_image(self) -> ImageBuffer {
        self.image
    }

    /// Display-ready copy of the buffer
    pub fn to_pixmap(&self) -> Pixmap {
        Pixmap::from_image(&self.image)
    }

    /// Whether the wrapped buffer holds no pixels
    pub fn is_null(&self) -> bool {
        self.image.is_null()
    }

    /// Blurs the matrix with a `(2 * radius + 1)` kernel and refreshes the
    /// buffer
    ///
    /// Zero does nothing. A negative radius, or one above
    /// [`blur::MAX_RADIUS`], logs a warning. Either way the wrapper is left
    /// as it was.
    pub fn gaussian_blur(&mut self, radius: i32) -> &mut Self {
        if radius == 0 {
            return self;
        }
        let ksize = match blur::check_radius(radius) {
            Ok(ksize) => ksize,
            Err(e) => {
                blur::warn_radius(&e);
                return self;
            }
        };
        if self.mat.is_empty() {
            return self;
        }

        blur::blur_in_place(&mut self.mat, ksize);
        let refreshed = convert::mat_to_image_as(&self.mat, self.image.format());
        if !refreshed.is_null() {
            self.image = refreshed;
        }
        self
    }
}

impl From<ImageBuffer> for ImageMat {
    fn from(image: ImageBuffer) -> Self {
        Self::from_image(image)
    }
}

impl From<ImageMat> for ImageBuffer {
    fn from(wrapper: ImageMat) -> Self {
        wrapper.into_image()
    }
}
