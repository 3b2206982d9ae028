//! Gaussian blur entry points
//!
//! A radius `r > 0` blurs with a `(2r + 1)` x `(2r + 1)` kernel whose sigma
//! is derived from the kernel size. A radius of zero or less, or one above
//! [`MAX_RADIUS`], logs a warning and hands the input back untouched.
//!
//! # Examples
//!
//! ```
//! use pixmat::{blur, buffer::ImageBuffer};
//!
//! let img = ImageBuffer::from_test_pattern(32, 32);
//! let blurred = blur::gaussian_blur_image(&img, 2);
//! assert_eq!(blurred.dimensions(), (32, 32));
//! assert_eq!(blurred.format(), img.format());
//!
//! assert_eq!(blur::blur_kernel_size(2), Some(5));
//! assert_eq!(blur::blur_kernel_size(0), None);
//! ```

use tracing::{debug, warn};

use crate::{
    buffer::{ImageBuffer, Pixmap},
    convert,
    error::{BridgeError, BridgeResult},
    mat::{Mat, filter},
};

/// Largest radius whose kernel fits within [`filter::MAX_KSIZE`]
pub const MAX_RADIUS: i32 = ((filter::MAX_KSIZE - 1) / 2) as i32;

/// Kernel size used for `radius`, or `None` outside `1..=MAX_RADIUS`
pub fn blur_kernel_size(radius: i32) -> Option<usize> {
    check_radius(radius).ok()
}

/// Kernel size for `radius`
///
/// # Errors
///
/// [`BridgeError::InvalidParameter`] for a radius outside `1..=MAX_RADIUS`.
pub fn check_radius(radius: i32) -> BridgeResult<usize> {
    let reason = if radius <= 0 {
        format!("must be greater than 0, got {}", radius)
    } else if radius > MAX_RADIUS {
        format!("must be at most {}, got {}", MAX_RADIUS, radius)
    } else {
        return Ok(radius as usize * 2 + 1);
    };
    Err(BridgeError::InvalidParameter {
        parameter: "radius".to_string(),
        reason,
    })
}

pub(crate) fn warn_radius(e: &BridgeError) {
    warn!("Blur skipped: {}", e);
}

pub(crate) fn blur_in_place(mat: &mut Mat<'_>, ksize: usize) {
    debug!("Gaussian blur {}x{} on {:?}", ksize, ksize, mat);
    if let Err(e) = filter::gaussian_blur(mat, ksize, 0.0) {
        warn!("Gaussian blur failed: {}", e);
    }
}

fn blur_image(img: &ImageBuffer, ksize: usize) -> ImageBuffer {
    let mut mat = convert::image_to_mat(img);
    if mat.is_empty() {
        return ImageBuffer::default();
    }
    blur_in_place(&mut mat, ksize);
    convert::mat_to_image_as(&mat, img.format())
}

/// Blurs a matrix in place and returns it
///
/// A view is detached before it is written, so the memory it borrowed is
/// left alone.
///
/// # Examples
///
/// ```
/// use pixmat::{blur::gaussian_blur_mat, mat::{ElemType, Mat}};
///
/// let mut mat = Mat::new(5, 5, ElemType::U8C1);
/// mat.row_mut(2)[2] = 255;
/// let mat = gaussian_blur_mat(mat, 1);
/// assert_eq!(mat.pixel(2, 1), mat.pixel(2, 3));
/// ```
pub fn gaussian_blur_mat<'a>(mut mat: Mat<'a>, radius: i32) -> Mat<'a> {
    match check_radius(radius) {
        Ok(ksize) => blur_in_place(&mut mat, ksize),
        Err(e) => warn_radius(&e),
    }
    mat
}

/// Returns a blurred copy of `img` in the same pixel format
///
/// Buffers the matrix mapper cannot represent come back null.
pub fn gaussian_blur_image(img: &ImageBuffer, radius: i32) -> ImageBuffer {
    match check_radius(radius) {
        Ok(ksize) => blur_image(img, ksize),
        Err(e) => {
            warn_radius(&e);
            img.clone()
        }
    }
}

/// Returns a blurred copy of `pixmap`
pub fn gaussian_blur_pixmap(pixmap: &Pixmap, radius: i32) -> Pixmap {
    match check_radius(radius) {
        Ok(ksize) => Pixmap::from_image(&blur_image(pixmap.image(), ksize)),
        Err(e) => {
            warn_radius(&e);
            pixmap.clone()
        }
    }
}
