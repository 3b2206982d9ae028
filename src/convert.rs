//! Buffer <-> matrix conversion
//!
//! The pixel format mapper decides, per buffer format, which matrix element
//! type describes the same bytes and whether channels need reordering:
//!
//! | Buffer format | Matrix | Reorder |
//! |---------------|--------|---------|
//! | `Grayscale8` | `U8C1` | none, zero-copy view |
//! | `Rgb32`, `Argb32`, `Argb32Premultiplied` | `U8C4` | none, zero-copy view |
//! | `Rgb888` | `U8C3` | RGB to BGR |
//! | `Rgba64` | `U16C4` | RGBA to BGRA, whole 16-bit words |
//!
//! A 32-bit `0xAARRGGBB` pixel is stored B, G, R, A on little-endian
//! machines, which is already the matrix channel order.
//!
//! Matrix to buffer conversion always copies into fresh buffer storage.
//!
//! The plain entry points never fail: unsupported formats log a warning and
//! return an empty matrix or a null buffer. The `try_*` variants return the
//! underlying [`BridgeError`].
//!
//! # Examples
//!
//! ```
//! use pixmat::{buffer::ImageBuffer, convert, model::PixelFormat};
//!
//! let img = ImageBuffer::from_packed(2, 1, PixelFormat::Rgb888, &[255, 0, 0, 255, 0, 0]).unwrap();
//! let mat = convert::image_to_mat(&img);
//! assert_eq!(mat.pixel(0, 0), &[0, 0, 255]);
//!
//! let back = convert::mat_to_image(&mat);
//! assert_eq!(back.pixel(1, 0), Some(&[255u8, 0, 0][..]));
//! ```

use std::path::Path;

use tracing::{debug, warn};

use crate::{
    buffer::ImageBuffer,
    error::{BridgeError, BridgeResult},
    mat::{ColorConversion, ElemType, Mat},
    model::{ContainerFormat, PixelFormat},
    resource::ResourceSet,
};

/// Matrix element type that mirrors `format`, if the mapper supports it
pub fn elem_type_for(format: PixelFormat) -> Option<ElemType> {
    match format {
        f if f.is_argb32_family() => Some(ElemType::U8C4),
        PixelFormat::Grayscale8 => Some(ElemType::U8C1),
        PixelFormat::Rgb888 => Some(ElemType::U8C3),
        PixelFormat::Rgba64 => Some(ElemType::U16C4),
        _ => None,
    }
}

/// Buffer format produced for a matrix of `elem_type`, if any
pub fn format_for(elem_type: ElemType) -> Option<PixelFormat> {
    match elem_type {
        ElemType::U8C4 => Some(PixelFormat::Argb32),
        ElemType::U8C3 => Some(PixelFormat::Rgb888),
        ElemType::U8C1 => Some(PixelFormat::Grayscale8),
        ElemType::U16C4 => Some(PixelFormat::Rgba64),
        _ => None,
    }
}

fn reorder_for(format: PixelFormat) -> Option<ColorConversion> {
    match format {
        PixelFormat::Rgb888 => Some(ColorConversion::RgbToBgr),
        PixelFormat::Rgba64 => Some(ColorConversion::RgbaToBgra),
        _ => None,
    }
}

/// Maps a buffer onto a matrix
///
/// Formats that need no reorder are returned as a view borrowing `img`.
/// `Rgb888` and `Rgba64` are reordered in place, which detaches the view
/// into an owned copy; `img` itself is never written. A null buffer maps to
/// the empty matrix.
///
/// # Errors
///
/// [`BridgeError::UnsupportedFormat`] for formats outside the mapping table.
pub fn try_image_to_mat(img: &ImageBuffer) -> BridgeResult<Mat<'_>> {
    if img.is_null() {
        return Ok(Mat::default());
    }
    let format = img.format();
    let elem_type = elem_type_for(format).ok_or(BridgeError::UnsupportedFormat { format })?;

    let mut mat = Mat::view(
        img.height() as usize,
        img.width() as usize,
        elem_type,
        img.bits(),
        img.bytes_per_line(),
    )?;
    if let Some(code) = reorder_for(format) {
        mat.cvt_color(code)?;
    }
    Ok(mat)
}

/// Maps a buffer onto a matrix, warning and returning an empty matrix for
/// unsupported formats
pub fn image_to_mat(img: &ImageBuffer) -> Mat<'_> {
    try_image_to_mat(img).unwrap_or_else(|e| {
        warn!("Image format not handled: {}", e);
        Mat::default()
    })
}

/// Copies a matrix into a new buffer of the default format for its type
///
/// `U8C4` becomes `Argb32`, `U8C3` becomes `Rgb888` (BGR to RGB), `U8C1`
/// becomes `Grayscale8` and `U16C4` becomes `Rgba64` (BGRA to RGBA). An
/// empty matrix becomes the null buffer.
///
/// # Errors
///
/// [`BridgeError::UnsupportedElemType`] for other element types.
pub fn try_mat_to_image(mat: &Mat<'_>) -> BridgeResult<ImageBuffer> {
    if mat.is_empty() {
        return Ok(ImageBuffer::default());
    }
    let format = format_for(mat.elem_type()).ok_or(BridgeError::UnsupportedElemType {
        elem_type: mat.elem_type(),
    })?;
    try_mat_to_image_as(mat, format)
}

/// Copies a matrix into a new buffer, warning and returning a null buffer
/// for unsupported element types
pub fn mat_to_image(mat: &Mat<'_>) -> ImageBuffer {
    try_mat_to_image(mat).unwrap_or_else(|e| {
        warn!("Matrix type not handled: {}", e);
        ImageBuffer::default()
    })
}

/// Copies a matrix into a new buffer tagged `format`
///
/// Lets a `U8C4` matrix come back as `Rgb32` or `Argb32Premultiplied`
/// instead of `Argb32`, so the source tag of a converted buffer survives.
///
/// # Errors
///
/// [`BridgeError::UnsupportedFormat`] when `format` does not map onto the
/// matrix element type.
pub fn try_mat_to_image_as(mat: &Mat<'_>, format: PixelFormat) -> BridgeResult<ImageBuffer> {
    if mat.is_empty() {
        return Ok(ImageBuffer::default());
    }
    if elem_type_for(format) != Some(mat.elem_type()) {
        return Err(BridgeError::UnsupportedFormat { format });
    }

    let mut out = ImageBuffer::new(mat.cols() as u32, mat.rows() as u32, format);
    let swap = reorder_for(format).is_some();
    let size = mat.elem_type().elem_size();
    let depth = mat.elem_type().depth_bytes();
    for r in 0..mat.rows() {
        let src = mat.row(r);
        let dst = &mut out.scan_line_mut(r as u32)[..src.len()];
        dst.copy_from_slice(src);
        if swap {
            for px in dst.chunks_exact_mut(size) {
                for k in 0..depth {
                    px.swap(k, 2 * depth + k);
                }
            }
        }
    }
    Ok(out)
}

/// Copies a matrix into a new buffer tagged `format`, warning and returning
/// a null buffer on mismatch
pub fn mat_to_image_as(mat: &Mat<'_>, format: PixelFormat) -> ImageBuffer {
    try_mat_to_image_as(mat, format).unwrap_or_else(|e| {
        warn!("Matrix type not handled: {}", e);
        ImageBuffer::default()
    })
}

/// Round-trips a buffer through a container and decodes it as BGR
///
/// Works for any buffer the encoder can read, including formats the direct
/// mapper rejects. The result always owns its bytes and is `U8C3`.
///
/// # Errors
///
/// Encoding or decoding failures from [`ImageBuffer::encode`] and
/// [`Mat::decode_color`].
pub fn try_image_to_mat_via(img: &ImageBuffer, format: ContainerFormat) -> BridgeResult<Mat<'static>> {
    let bytes = img.encode(format)?;
    Mat::decode_color(&bytes)
}

/// Round-trips a buffer through a container, warning and returning an empty
/// matrix on failure
pub fn image_to_mat_via(img: &ImageBuffer, format: ContainerFormat) -> Mat<'static> {
    try_image_to_mat_via(img, format).unwrap_or_else(|e| {
        warn!("Round trip through {} failed: {}", format, e);
        Mat::default()
    })
}

/// Reads a packaged (`:/`) or on-disk image as a 3-channel BGR matrix
///
/// A missing or unreadable resource is not reported; the matrix is simply
/// empty.
pub fn load_resource_to_mat(path: impl AsRef<Path>) -> Mat<'static> {
    let path = path.as_ref();
    debug!("Loading resource {}", path.display());
    ResourceSet::bundled().load_mat(path)
}
