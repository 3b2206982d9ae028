//! Container encoders for image buffers
//!
//! Converts [`ImageBuffer`] instances into PNG, JPEG, BMP or WebP bytes. Used
//! by the encode/decode round trip in [`crate::convert`] and by
//! [`ImageBuffer::save`].
//!
//! # Format Support
//!
//! - **PNG**: Lossless, three compression levels (Fast, Default, Best); 8-bit
//!   gray, RGB, RGBA and 16-bit RGBA are written at their native depth
//! - **JPEG**: Lossy with quality 1-100, alpha is dropped
//! - **BMP**: Uncompressed, RGB or RGBA depending on the source format
//! - **WebP**: Lossless only in image crate v0.25
//!
//! Quality defaults come from [`crate::config`].
//!
//! # Examples
//!
//! ```
//! use pixmat::{buffer::ImageBuffer, model::ContainerFormat, util::encode::encode_image};
//!
//! let img = ImageBuffer::from_test_pattern(320, 240);
//! let png_bytes = encode_image(&img, ContainerFormat::Png).unwrap();
//! assert_eq!(&png_bytes[1..4], b"PNG");
//! ```

use std::io::Cursor;

use image::{
    DynamicImage, ImageEncoder,
    codecs::{
        bmp::BmpEncoder,
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};

use crate::{
    buffer::ImageBuffer,
    config,
    error::{BridgeError, BridgeResult},
    model::ContainerFormat,
};

/// Maps a quality value (0-100) to a PNG compression type
///
/// PNG has no quality parameter in the JPEG sense, so quality ranges map to
/// compression levels:
/// - 0-33: Fast compression (faster encoding, larger files)
/// - 34-66: Default compression (balanced)
/// - 67-100: Best compression (slower encoding, smaller files)
///
/// # Examples
///
/// ```
/// use image::codecs::png::CompressionType;
/// use pixmat::util::encode::compression_type_from_quality;
///
/// assert!(matches!(compression_type_from_quality(20), CompressionType::Fast));
/// assert!(matches!(compression_type_from_quality(50), CompressionType::Default));
/// assert!(matches!(compression_type_from_quality(90), CompressionType::Best));
/// ```
pub fn compression_type_from_quality(quality: u8) -> CompressionType {
    match quality {
        0..=33 => CompressionType::Fast,
        34..=66 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn decoded(buffer: &ImageBuffer) -> BridgeResult<DynamicImage> {
    if buffer.is_null() {
        return Err(BridgeError::InvalidParameter {
            parameter: "dimensions".to_string(),
            reason:    "Cannot encode a null image".to_string(),
        });
    }
    buffer.to_dynamic().ok_or(BridgeError::UnsupportedFormat {
        format: buffer.format(),
    })
}

fn encoding_failed(format: ContainerFormat) -> impl FnOnce(image::ImageError) -> BridgeError {
    move |e| BridgeError::EncodingFailed {
        format: format.to_string(),
        reason: e.to_string(),
    }
}

/// Encodes an image as PNG with the configured compression
///
/// # Examples
///
/// ```
/// use pixmat::{buffer::ImageBuffer, util::encode::encode_png};
///
/// let img = ImageBuffer::from_test_pattern(100, 100);
/// let png_bytes = encode_png(&img).unwrap();
/// assert!(!png_bytes.is_empty());
/// ```
pub fn encode_png(buffer: &ImageBuffer) -> BridgeResult<Vec<u8>> {
    encode_png_with_compression(buffer, compression_type_from_quality(config::png_quality()))
}

/// Encodes an image as PNG with specified compression level
///
/// Higher compression levels produce smaller files but take longer to
/// encode. Gray, RGB and 16-bit buffers keep their channel layout; every
/// other format is written as 8-bit RGBA.
pub fn encode_png_with_compression(
    buffer: &ImageBuffer,
    compression: CompressionType,
) -> BridgeResult<Vec<u8>> {
    let decoded = decoded(buffer)?;
    let mut output = Vec::new();

    // Adaptive filter picks the best predictor per scanline
    let encoder =
        PngEncoder::new_with_quality(Cursor::new(&mut output), compression, FilterType::Adaptive);

    decoded
        .write_with_encoder(encoder)
        .map_err(encoding_failed(ContainerFormat::Png))?;

    Ok(output)
}

/// Encodes an image as JPEG with specified quality
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
///
/// # Examples
///
/// ```
/// use pixmat::{buffer::ImageBuffer, util::encode::encode_jpeg};
///
/// let img = ImageBuffer::from_test_pattern(100, 100);
/// let low = encode_jpeg(&img, 30).unwrap();
/// let high = encode_jpeg(&img, 95).unwrap();
/// assert!(high.len() > low.len());
/// ```
pub fn encode_jpeg(buffer: &ImageBuffer, quality: u8) -> BridgeResult<Vec<u8>> {
    let quality = quality.clamp(1, 100);
    let rgb = decoded(buffer)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut output), quality);
    encoder
        .write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .map_err(encoding_failed(ContainerFormat::Jpeg))?;

    Ok(output)
}

/// Encodes an image as uncompressed BMP
///
/// Formats with alpha are written as 32-bit RGBA, the rest as 24-bit RGB.
pub fn encode_bmp(buffer: &ImageBuffer) -> BridgeResult<Vec<u8>> {
    let decoded = decoded(buffer)?;
    let (width, height) = (decoded.width(), decoded.height());

    let mut cursor = Cursor::new(Vec::new());
    let encoder = BmpEncoder::new(&mut cursor);
    let result = if buffer.format().has_alpha() {
        let rgba = decoded.to_rgba8();
        encoder.write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
    } else {
        let rgb = decoded.to_rgb8();
        encoder.write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
    };
    result.map_err(encoding_failed(ContainerFormat::Bmp))?;

    Ok(cursor.into_inner())
}

/// Encodes an image as WebP (lossless only)
///
/// The `image` crate v0.25 only ships a lossless WebP encoder, so there is
/// no quality parameter.
pub fn encode_webp(buffer: &ImageBuffer) -> BridgeResult<Vec<u8>> {
    let rgba = decoded(buffer)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut output = Vec::new();
    let encoder = WebPEncoder::new_lossless(Cursor::new(&mut output));
    encoder
        .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(encoding_failed(ContainerFormat::Webp))?;

    Ok(output)
}

/// Encodes an image into the requested container
///
/// PNG compression and JPEG quality come from [`config::png_quality`] and
/// [`config::jpeg_quality`].
///
/// # Errors
///
/// - [`BridgeError::InvalidParameter`] for a null buffer
/// - [`BridgeError::UnsupportedFormat`] for formats that need a color table
/// - [`BridgeError::EncodingFailed`] when the codec rejects the pixels
pub fn encode_image(buffer: &ImageBuffer, format: ContainerFormat) -> BridgeResult<Vec<u8>> {
    match format {
        ContainerFormat::Png => encode_png(buffer),
        ContainerFormat::Jpeg => encode_jpeg(buffer, config::jpeg_quality()),
        ContainerFormat::Bmp => encode_bmp(buffer),
        ContainerFormat::Webp => encode_webp(buffer),
    }
}
