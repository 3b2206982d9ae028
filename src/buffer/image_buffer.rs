//! Toolkit-side image buffer
//!
//! [`ImageBuffer`] is a format-tagged, stride-aware pixel array. Rows are
//! padded to a 4-byte boundary when the buffer allocates them itself, and the
//! pixel bytes live behind an `Arc` so clones are shallow: the first mutation
//! through [`bits_mut()`](ImageBuffer::bits_mut) detaches the clone.
//!
//! # Examples
//!
//! ```
//! use pixmat::{buffer::ImageBuffer, model::{PixelFormat, Rect}};
//!
//! let img = ImageBuffer::from_test_pattern(640, 480);
//! assert_eq!(img.format(), PixelFormat::Argb32);
//!
//! let cropped = img.crop(Rect::new(100, 100, 200, 100)).unwrap();
//! assert_eq!(cropped.dimensions(), (200, 100));
//! ```

use std::{path::Path, sync::Arc};

use image::DynamicImage;

use crate::{
    error::{BridgeError, BridgeResult},
    model::{ContainerFormat, PixelFormat, Rect},
};

/// Format-tagged pixel buffer with copy-on-write storage
#[derive(Clone, Debug, Default)]
pub struct ImageBuffer {
    width:          u32,
    height:         u32,
    bytes_per_line: usize,
    format:         PixelFormat,
    data:           Arc<Vec<u8>>,
}

fn aligned_bytes_per_line(format: PixelFormat, width: u32) -> usize {
    format.min_bytes_per_line(width).next_multiple_of(4)
}

fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    u32::from_be_bytes([a, r, g, b]).to_ne_bytes()
}

fn unpack_argb(px: &[u8]) -> [u8; 4] {
    let [a, r, g, b] = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]).to_be_bytes();
    [r, g, b, a]
}

fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
}

/// Packs `img` into tightly packed rows of `format`, or `None` if the format
/// cannot be produced from a decoded image.
fn pack(img: &DynamicImage, format: PixelFormat) -> Option<Vec<u8>> {
    let packed = match format {
        PixelFormat::Grayscale8 => img.to_luma8().into_raw(),
        PixelFormat::Grayscale16 => img
            .to_luma16()
            .into_raw()
            .into_iter()
            .flat_map(u16::to_ne_bytes)
            .collect(),
        PixelFormat::Rgb888 => img.to_rgb8().into_raw(),
        PixelFormat::Rgba8888 => img.to_rgba8().into_raw(),
        PixelFormat::Rgb32 => img
            .to_rgba8()
            .pixels()
            .flat_map(|p| pack_argb(p[0], p[1], p[2], 0xff))
            .collect(),
        PixelFormat::Argb32 => img
            .to_rgba8()
            .pixels()
            .flat_map(|p| pack_argb(p[0], p[1], p[2], p[3]))
            .collect(),
        PixelFormat::Argb32Premultiplied => img
            .to_rgba8()
            .pixels()
            .flat_map(|p| {
                let a = p[3];
                pack_argb(premultiply(p[0], a), premultiply(p[1], a), premultiply(p[2], a), a)
            })
            .collect(),
        PixelFormat::Rgba64 => img
            .to_rgba16()
            .into_raw()
            .into_iter()
            .flat_map(u16::to_ne_bytes)
            .collect(),
        PixelFormat::Invalid | PixelFormat::Mono | PixelFormat::Indexed8 | PixelFormat::Rgb16 => {
            return None;
        }
    };
    Some(packed)
}

fn ne_words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|w| u16::from_ne_bytes([w[0], w[1]]))
        .collect()
}

impl ImageBuffer {
    /// Creates a zero-filled buffer
    ///
    /// A zero dimension or the `Invalid` format yields a null buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixmat::{buffer::ImageBuffer, model::PixelFormat};
    ///
    /// let img = ImageBuffer::new(3, 2, PixelFormat::Rgb888);
    /// // 9 bytes of pixels, padded to 12
    /// assert_eq!(img.bytes_per_line(), 12);
    /// assert!(ImageBuffer::new(0, 2, PixelFormat::Rgb888).is_null());
    /// ```
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        if width == 0 || height == 0 || format == PixelFormat::Invalid {
            return Self::default();
        }
        let bytes_per_line = aligned_bytes_per_line(format, width);
        Self {
            width,
            height,
            bytes_per_line,
            format,
            data: Arc::new(vec![0; bytes_per_line * height as usize]),
        }
    }

    /// Wraps existing pixel bytes with an explicit stride
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidParameter`] for a zero dimension, the `Invalid`
    ///   format, or a stride shorter than one row of pixels
    /// - [`BridgeError::BufferTooSmall`] when `data` is shorter than
    ///   `bytes_per_line * height`
    pub fn from_raw(
        width: u32,
        height: u32,
        bytes_per_line: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> BridgeResult<Self> {
        if width == 0 || height == 0 {
            return Err(BridgeError::InvalidParameter {
                parameter: "dimensions".to_string(),
                reason:    format!("Image dimensions must be > 0, got {}x{}", width, height),
            });
        }
        if format == PixelFormat::Invalid {
            return Err(BridgeError::InvalidParameter {
                parameter: "format".to_string(),
                reason:    "A pixel format is required".to_string(),
            });
        }
        let min = format.min_bytes_per_line(width);
        if bytes_per_line < min {
            return Err(BridgeError::InvalidParameter {
                parameter: "bytes_per_line".to_string(),
                reason:    format!("Stride {} is shorter than one row ({} bytes)", bytes_per_line, min),
            });
        }
        let expected = bytes_per_line * height as usize;
        if data.len() < expected {
            return Err(BridgeError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            bytes_per_line,
            format,
            data: Arc::new(data),
        })
    }

    /// Builds a buffer from tightly packed rows, padding each row to the
    /// buffer's own alignment
    ///
    /// # Examples
    ///
    /// ```
    /// use pixmat::{buffer::ImageBuffer, model::PixelFormat};
    ///
    /// let img = ImageBuffer::from_packed(1, 1, PixelFormat::Grayscale8, &[128]).unwrap();
    /// assert_eq!(img.pixel(0, 0), Some(&[128u8][..]));
    /// ```
    pub fn from_packed(
        width: u32,
        height: u32,
        format: PixelFormat,
        packed: &[u8],
    ) -> BridgeResult<Self> {
        let mut img = Self::new(width, height, format);
        if img.is_null() {
            return Err(BridgeError::InvalidParameter {
                parameter: "dimensions".to_string(),
                reason:    format!("Cannot build a {}x{} {} buffer", width, height, format),
            });
        }
        let row = format.min_bytes_per_line(width);
        let expected = row * height as usize;
        if packed.len() < expected {
            return Err(BridgeError::BufferTooSmall {
                expected,
                actual: packed.len(),
            });
        }
        for (y, src) in packed.chunks_exact(row).take(height as usize).enumerate() {
            img.scan_line_mut(y as u32)[..row].copy_from_slice(src);
        }
        Ok(img)
    }

    /// Converts a decoded image into the closest buffer format
    ///
    /// Gray 8-bit becomes `Grayscale8`, RGB 8-bit becomes `Rgb888`, 16-bit
    /// images become `Rgba64` and everything else becomes `Argb32`.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let format = match &img {
            DynamicImage::ImageLuma8(_) => PixelFormat::Grayscale8,
            DynamicImage::ImageRgb8(_) => PixelFormat::Rgb888,
            DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_) => PixelFormat::Rgba64,
            _ => PixelFormat::Argb32,
        };
        Self::from_dynamic_as(&img, format).unwrap_or_default()
    }

    /// Converts a decoded image into a buffer of the requested format
    pub fn from_dynamic_as(img: &DynamicImage, format: PixelFormat) -> BridgeResult<Self> {
        let packed = pack(img, format).ok_or(BridgeError::UnsupportedFormat { format })?;
        Self::from_packed(img.width(), img.height(), format, &packed)
    }

    /// Converts the buffer into a decoded `image` crate value
    ///
    /// Returns `None` for null buffers and for formats that need a color
    /// table or bit unpacking (`Mono`, `Indexed8`, `Rgb16`).
    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        if self.is_null() {
            return None;
        }
        let (w, h) = self.dimensions();
        let packed = self.packed_rows();
        match self.format {
            PixelFormat::Grayscale8 => image::GrayImage::from_raw(w, h, packed).map(DynamicImage::ImageLuma8),
            PixelFormat::Grayscale16 => {
                image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(w, h, ne_words(&packed))
                    .map(DynamicImage::ImageLuma16)
            }
            PixelFormat::Rgb888 => image::RgbImage::from_raw(w, h, packed).map(DynamicImage::ImageRgb8),
            PixelFormat::Rgba8888 => {
                image::RgbaImage::from_raw(w, h, packed).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Rgb32 | PixelFormat::Argb32 | PixelFormat::Argb32Premultiplied => {
                let format = self.format;
                let rgba = packed
                    .chunks_exact(4)
                    .flat_map(|px| {
                        let [r, g, b, a] = unpack_argb(px);
                        match format {
                            PixelFormat::Rgb32 => [r, g, b, 0xff],
                            PixelFormat::Argb32Premultiplied => {
                                [unpremultiply(r, a), unpremultiply(g, a), unpremultiply(b, a), a]
                            }
                            _ => [r, g, b, a],
                        }
                    })
                    .collect();
                image::RgbaImage::from_raw(w, h, rgba).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Rgba64 => {
                image::ImageBuffer::<image::Rgba<u16>, Vec<u16>>::from_raw(w, h, ne_words(&packed))
                    .map(DynamicImage::ImageRgba16)
            }
            PixelFormat::Invalid | PixelFormat::Mono | PixelFormat::Indexed8 | PixelFormat::Rgb16 => {
                None
            }
        }
    }

    /// Decodes an image file
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let img = image::open(path.as_ref())?;
        Ok(Self::from_dynamic(img))
    }

    /// Decodes an in-memory PNG/JPEG/BMP/WebP image
    pub fn from_encoded(bytes: &[u8]) -> BridgeResult<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(img))
    }

    /// Decodes in-memory bytes as the given container, skipping format
    /// detection
    pub fn from_encoded_as(bytes: &[u8], format: ContainerFormat) -> BridgeResult<Self> {
        let img = image::load_from_memory_with_format(bytes, format.image_format())?;
        Ok(Self::from_dynamic(img))
    }

    /// Encodes the buffer into a container
    pub fn encode(&self, format: ContainerFormat) -> BridgeResult<Vec<u8>> {
        crate::util::encode::encode_image(self, format)
    }

    /// Encodes and writes the buffer to `path`
    ///
    /// Without an explicit `format` the container is guessed from the file
    /// extension, falling back to PNG.
    pub fn save(&self, path: impl AsRef<Path>, format: Option<ContainerFormat>) -> BridgeResult<()> {
        let path = path.as_ref();
        let format = format
            .or_else(|| ContainerFormat::from_path(path))
            .unwrap_or_default();
        let bytes = self.encode(format)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Whether the buffer holds no pixels
    pub fn is_null(&self) -> bool {
        self.width == 0 || self.height == 0 || self.format == PixelFormat::Invalid
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of two consecutive rows
    pub fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    /// Pixel format tag
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// All pixel bytes, including row padding
    pub fn bits(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel bytes; detaches from any shallow clones first
    pub fn bits_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Row `y` including its padding
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of range.
    pub fn scan_line(&self, y: u32) -> &[u8] {
        let start = y as usize * self.bytes_per_line;
        &self.data[start..start + self.bytes_per_line]
    }

    /// Mutable row `y`; detaches from any shallow clones first
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of range.
    pub fn scan_line_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.bytes_per_line;
        let bpl = self.bytes_per_line;
        &mut self.bits_mut()[start..start + bpl]
    }

    fn pixel_range(&self, x: u32, y: u32) -> Option<std::ops::Range<usize>> {
        let bpp = self.format.bits_per_pixel();
        if x >= self.width || y >= self.height || bpp < 8 {
            return None;
        }
        let size = bpp / 8;
        let start = y as usize * self.bytes_per_line + x as usize * size;
        Some(start..start + size)
    }

    /// Bytes of the pixel at (`x`, `y`) in storage order
    ///
    /// `None` when out of range or for sub-byte formats.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        self.pixel_range(x, y).map(|r| &self.data[r])
    }

    /// Mutable bytes of the pixel at (`x`, `y`)
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let range = self.pixel_range(x, y)?;
        Some(&mut self.bits_mut()[range])
    }

    /// Rows concatenated without padding
    pub fn packed_rows(&self) -> Vec<u8> {
        let row = self.format.min_bytes_per_line(self.width);
        (0..self.height)
            .flat_map(|y| self.scan_line(y)[..row].iter().copied())
            .collect()
    }

    /// Deep copy that never shares storage with `self`
    pub fn copy(&self) -> Self {
        Self {
            data: Arc::new(self.data.as_ref().clone()),
            ..self.clone()
        }
    }

    /// Whether both buffers currently point at the same storage
    pub fn shares_data_with(&self, other: &ImageBuffer) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Returns a copy with the red and blue channels exchanged
    ///
    /// Formats without separate red and blue channels are copied unchanged.
    pub fn rgb_swapped(&self) -> Self {
        let mut out = self.copy();
        let row = self.format.min_bytes_per_line(self.width);
        let format = self.format;
        for y in 0..self.height {
            let line = &mut out.scan_line_mut(y)[..row];
            match format {
                PixelFormat::Rgb888 => line.chunks_exact_mut(3).for_each(|px| px.swap(0, 2)),
                PixelFormat::Rgba8888 => line.chunks_exact_mut(4).for_each(|px| px.swap(0, 2)),
                PixelFormat::Rgb32 | PixelFormat::Argb32 | PixelFormat::Argb32Premultiplied => {
                    line.chunks_exact_mut(4).for_each(|px| {
                        let [r, g, b, a] = unpack_argb(px);
                        px.copy_from_slice(&pack_argb(b, g, r, a));
                    })
                }
                PixelFormat::Rgba64 => line.chunks_exact_mut(8).for_each(|px| {
                    let (red, rest) = px.split_at_mut(2);
                    red.swap_with_slice(&mut rest[2..4]);
                }),
                _ => break,
            }
        }
        out
    }

    /// Re-encodes the pixels into another format
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnsupportedFormat`] when either side cannot be
    /// expressed through a decoded image.
    pub fn convert_to_format(&self, format: PixelFormat) -> BridgeResult<Self> {
        if self.format == format {
            return Ok(self.clone());
        }
        let decoded = self.to_dynamic().ok_or(BridgeError::UnsupportedFormat {
            format: self.format,
        })?;
        Self::from_dynamic_as(&decoded, format)
    }

    /// Crops the image to the specified region
    ///
    /// The region must be non-empty and within the image bounds.
    pub fn crop(&self, region: Rect) -> BridgeResult<Self> {
        let (img_width, img_height) = self.dimensions();

        if region.is_empty() || region.x < 0 || region.y < 0 {
            return Err(BridgeError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!("Region {:?} is empty or has a negative origin", region),
            });
        }

        let (x, y, w, h) = (region.x as u32, region.y as u32, region.width as u32, region.height as u32);
        if x as u64 + w as u64 > img_width as u64 || y as u64 + h as u64 > img_height as u64 {
            return Err(BridgeError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!(
                    "Region ({}x{} at {},{}) extends beyond image bounds ({}x{})",
                    w, h, x, y, img_width, img_height
                ),
            });
        }

        let bpp = self.format.bits_per_pixel();
        if bpp < 8 {
            return Err(BridgeError::UnsupportedFormat {
                format: self.format,
            });
        }
        let size = bpp / 8;
        let mut out = Self::new(w, h, self.format);
        for row in 0..h {
            let src = &self.scan_line(y + row)[x as usize * size..(x + w) as usize * size];
            out.scan_line_mut(row)[..src.len()].copy_from_slice(src);
        }
        Ok(out)
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// An opaque `Argb32` vertical gradient from blue (top) to cyan (bottom).
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let mut img = Self::new(width, height, PixelFormat::Argb32);
        for y in 0..height {
            let ratio = y as f32 / height.max(1) as f32;
            let px = pack_argb(0, (255.0 * ratio) as u8, 255, 255);
            for chunk in img.scan_line_mut(y).chunks_exact_mut(4).take(width as usize) {
                chunk.copy_from_slice(&px);
            }
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed_and_aligned() {
        let img = ImageBuffer::new(5, 3, PixelFormat::Grayscale8);
        assert_eq!(img.bytes_per_line(), 8);
        assert_eq!(img.bits().len(), 24);
        assert!(img.bits().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_null_buffer() {
        let img = ImageBuffer::default();
        assert!(img.is_null());
        assert_eq!(img.format(), PixelFormat::Invalid);
        assert!(ImageBuffer::new(10, 10, PixelFormat::Invalid).is_null());
        assert!(img.to_dynamic().is_none());
    }

    #[test]
    fn test_from_raw_validation() {
        assert!(ImageBuffer::from_raw(2, 2, 8, PixelFormat::Rgb888, vec![0; 16]).is_ok());

        let short_stride = ImageBuffer::from_raw(2, 2, 5, PixelFormat::Rgb888, vec![0; 16]);
        assert!(matches!(short_stride, Err(BridgeError::InvalidParameter { .. })));

        let short_data = ImageBuffer::from_raw(2, 2, 8, PixelFormat::Rgb888, vec![0; 10]);
        assert!(matches!(
            short_data,
            Err(BridgeError::BufferTooSmall {
                expected: 16,
                actual:   10,
            })
        ));

        let invalid = ImageBuffer::from_raw(2, 2, 8, PixelFormat::Invalid, vec![0; 16]);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_from_packed_pads_rows() {
        let img = ImageBuffer::from_packed(
            2,
            2,
            PixelFormat::Rgb888,
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        )
        .unwrap();
        assert_eq!(img.bytes_per_line(), 8);
        assert_eq!(img.pixel(1, 1), Some(&[10u8, 11, 12][..]));
        assert_eq!(img.packed_rows(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_clone_is_shallow_until_written() {
        let original = ImageBuffer::from_test_pattern(4, 4);
        let mut cloned = original.clone();
        assert!(cloned.shares_data_with(&original));

        cloned.pixel_mut(0, 0).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        assert!(!cloned.shares_data_with(&original));
        assert_ne!(original.pixel(0, 0), cloned.pixel(0, 0));
    }

    #[test]
    fn test_copy_is_deep() {
        let img = ImageBuffer::from_test_pattern(4, 4);
        let copy = img.copy();
        assert!(!copy.shares_data_with(&img));
        assert_eq!(copy.bits(), img.bits());
    }

    #[test]
    fn test_argb32_memory_order() {
        let decoded = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba([10, 20, 30, 40]),
        ));
        let img = ImageBuffer::from_dynamic_as(&decoded, PixelFormat::Argb32).unwrap();
        let px = img.pixel(0, 0).unwrap();
        assert_eq!(u32::from_ne_bytes([px[0], px[1], px[2], px[3]]), 0x280a141e);
        #[cfg(target_endian = "little")]
        assert_eq!(px, &[30, 20, 10, 40]);
    }

    #[test]
    fn test_rgb32_forces_opaque_alpha() {
        let decoded = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba([10, 20, 30, 0]),
        ));
        let img = ImageBuffer::from_dynamic_as(&decoded, PixelFormat::Rgb32).unwrap();
        let back = img.to_dynamic().unwrap().to_rgba8();
        assert_eq!(back.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_premultiplied_round_trip_opaque() {
        let img = ImageBuffer::from_test_pattern(8, 8);
        let premul = img.convert_to_format(PixelFormat::Argb32Premultiplied).unwrap();
        let back = premul.convert_to_format(PixelFormat::Argb32).unwrap();
        assert_eq!(back.bits(), img.bits());
    }

    #[test]
    fn test_premultiply_values() {
        assert_eq!(premultiply(255, 128), 128);
        assert_eq!(premultiply(100, 0), 0);
        assert_eq!(unpremultiply(128, 128), 255);
        assert_eq!(unpremultiply(50, 0), 0);
    }

    #[test]
    fn test_from_dynamic_format_choice() {
        let gray = ImageBuffer::from_dynamic(DynamicImage::new_luma8(3, 3));
        assert_eq!(gray.format(), PixelFormat::Grayscale8);

        let rgb = ImageBuffer::from_dynamic(DynamicImage::new_rgb8(3, 3));
        assert_eq!(rgb.format(), PixelFormat::Rgb888);

        let deep = ImageBuffer::from_dynamic(DynamicImage::new_rgb16(3, 3));
        assert_eq!(deep.format(), PixelFormat::Rgba64);

        let la = ImageBuffer::from_dynamic(DynamicImage::new_luma_a8(3, 3));
        assert_eq!(la.format(), PixelFormat::Argb32);
    }

    #[test]
    fn test_rgba64_words_round_trip() {
        let decoded = DynamicImage::ImageRgba16(image::ImageBuffer::from_pixel(
            2,
            1,
            image::Rgba([1000u16, 2000, 3000, 65535]),
        ));
        let img = ImageBuffer::from_dynamic(decoded);
        assert_eq!(img.format(), PixelFormat::Rgba64);
        let px = img.pixel(1, 0).unwrap();
        assert_eq!(u16::from_ne_bytes([px[0], px[1]]), 1000);
        assert_eq!(u16::from_ne_bytes([px[4], px[5]]), 3000);

        let back = img.to_dynamic().unwrap().to_rgba16();
        assert_eq!(back.get_pixel(0, 0).0, [1000, 2000, 3000, 65535]);
    }

    #[test]
    fn test_rgb_swapped() {
        let rgb = ImageBuffer::from_packed(1, 1, PixelFormat::Rgb888, &[1, 2, 3]).unwrap();
        assert_eq!(rgb.rgb_swapped().pixel(0, 0), Some(&[3u8, 2, 1][..]));

        let argb = ImageBuffer::from_test_pattern(1, 1);
        let swapped = argb.rgb_swapped().to_dynamic().unwrap().to_rgba8();
        assert_eq!(swapped.get_pixel(0, 0).0, [255, 0, 0, 255]);

        let gray = ImageBuffer::from_packed(1, 1, PixelFormat::Grayscale8, &[7]).unwrap();
        assert_eq!(gray.rgb_swapped().pixel(0, 0), Some(&[7u8][..]));
    }

    #[test]
    fn test_rgb_swapped_rgba64() {
        let mut packed = Vec::new();
        for w in [1u16, 2, 3, 4] {
            packed.extend_from_slice(&w.to_ne_bytes());
        }
        let img = ImageBuffer::from_packed(1, 1, PixelFormat::Rgba64, &packed).unwrap();
        let swapped = img.rgb_swapped();
        let px = swapped.pixel(0, 0).unwrap();
        let words: Vec<u16> = ne_words(px);
        assert_eq!(words, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_convert_to_format() {
        let img = ImageBuffer::from_test_pattern(4, 4);
        let gray = img.convert_to_format(PixelFormat::Grayscale8).unwrap();
        assert_eq!(gray.format(), PixelFormat::Grayscale8);
        assert_eq!(gray.dimensions(), (4, 4));

        let mono = ImageBuffer::new(8, 1, PixelFormat::Mono);
        assert!(matches!(
            mono.convert_to_format(PixelFormat::Argb32),
            Err(BridgeError::UnsupportedFormat {
                format: PixelFormat::Mono,
            })
        ));
        assert!(img.convert_to_format(PixelFormat::Indexed8).is_err());
    }

    #[test]
    fn test_crop_valid_region() {
        let img = ImageBuffer::from_test_pattern(1920, 1080);
        let cropped = img.crop(Rect::new(460, 240, 1000, 600)).unwrap();
        assert_eq!(cropped.dimensions(), (1000, 600));
        assert_eq!(cropped.pixel(0, 0), img.pixel(460, 240));
    }

    #[test]
    fn test_crop_boundary_check() {
        let img = ImageBuffer::from_test_pattern(1920, 1080);

        let full = img.crop(Rect::new(0, 0, 1920, 1080)).unwrap();
        assert_eq!(full.dimensions(), (1920, 1080));

        let corner = img.crop(Rect::new(1820, 980, 100, 100)).unwrap();
        assert_eq!(corner.dimensions(), (100, 100));
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let img = ImageBuffer::from_test_pattern(1920, 1080);

        assert!(img.crop(Rect::new(2000, 1000, 100, 100)).is_err());
        assert!(img.crop(Rect::new(1900, 1000, 200, 200)).is_err());
        assert!(img.crop(Rect::new(-1, 0, 10, 10)).is_err());
        assert!(img.crop(Rect::new(0, 0, 0, 10)).is_err());
    }

    #[test]
    fn test_from_test_pattern() {
        let img = ImageBuffer::from_test_pattern(100, 100);
        assert_eq!(img.dimensions(), (100, 100));

        let top = img.to_dynamic().unwrap().to_rgba8();
        assert_eq!(top.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert!(top.get_pixel(0, 99)[1] > 200);
    }

    #[test]
    fn test_encoded_round_trip() {
        let img = ImageBuffer::from_test_pattern(16, 16);
        let png = img.encode(ContainerFormat::Png).unwrap();
        let decoded = ImageBuffer::from_encoded(&png).unwrap();
        assert_eq!(decoded.format(), PixelFormat::Argb32);
        assert_eq!(decoded.bits(), img.bits());
    }

    #[test]
    fn test_from_encoded_as() {
        let img = ImageBuffer::from_test_pattern(6, 6);
        let bmp = img.encode(ContainerFormat::Bmp).unwrap();

        let decoded = ImageBuffer::from_encoded_as(&bmp, ContainerFormat::Bmp).unwrap();
        assert_eq!(decoded.dimensions(), (6, 6));
        assert!(ImageBuffer::from_encoded_as(&bmp, ContainerFormat::Png).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pattern.bmp");

        let img = ImageBuffer::from_test_pattern(10, 6);
        img.save(&path, None).unwrap();

        let loaded = ImageBuffer::load(&path).unwrap();
        assert_eq!(loaded.dimensions(), (10, 6));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ImageBuffer::load("/nonexistent/definitely/missing.png").is_err());
    }
}
