//! Data models and type definitions for pixmat
//!
//! This module defines the small value types shared across the crate:
//! - Pixel format tags carried by [`ImageBuffer`](crate::buffer::ImageBuffer)
//! - Container formats used for encode/decode round trips
//! - Integer geometry (points and rectangles) for screen grabbing

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pixel layout tag of a toolkit image buffer
///
/// 32-bit formats store one `u32` per pixel as `0xAARRGGBB`; on a
/// little-endian machine the bytes in memory are therefore B, G, R, A.
/// `Rgba64` stores four native-endian `u16` words in R, G, B, A order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Null buffer, no pixel data
    #[default]
    Invalid,
    /// 1 bit per pixel, MSB first
    Mono,
    /// 8-bit palette index
    Indexed8,
    /// 16-bit 5-6-5 RGB
    Rgb16,
    /// 8-bit single channel
    Grayscale8,
    /// 16-bit single channel
    Grayscale16,
    /// 32-bit `0xffRRGGBB`
    Rgb32,
    /// 32-bit `0xAARRGGBB`
    Argb32,
    /// 32-bit `0xAARRGGBB`, color channels premultiplied by alpha
    Argb32Premultiplied,
    /// 24-bit, bytes in R, G, B order
    Rgb888,
    /// 32-bit, bytes in R, G, B, A order
    Rgba8888,
    /// 64-bit, `u16` words in R, G, B, A order
    Rgba64,
}

impl PixelFormat {
    /// Returns the format name as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Invalid => "invalid",
            PixelFormat::Mono => "mono",
            PixelFormat::Indexed8 => "indexed8",
            PixelFormat::Rgb16 => "rgb16",
            PixelFormat::Grayscale8 => "grayscale8",
            PixelFormat::Grayscale16 => "grayscale16",
            PixelFormat::Rgb32 => "rgb32",
            PixelFormat::Argb32 => "argb32",
            PixelFormat::Argb32Premultiplied => "argb32_premultiplied",
            PixelFormat::Rgb888 => "rgb888",
            PixelFormat::Rgba8888 => "rgba8888",
            PixelFormat::Rgba64 => "rgba64",
        }
    }

    /// Storage bits used by one pixel
    pub fn bits_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Invalid => 0,
            PixelFormat::Mono => 1,
            PixelFormat::Indexed8 | PixelFormat::Grayscale8 => 8,
            PixelFormat::Rgb16 | PixelFormat::Grayscale16 => 16,
            PixelFormat::Rgb888 => 24,
            PixelFormat::Rgb32
            | PixelFormat::Argb32
            | PixelFormat::Argb32Premultiplied
            | PixelFormat::Rgba8888 => 32,
            PixelFormat::Rgba64 => 64,
        }
    }

    /// Bytes needed for one row of `width` pixels, without padding
    pub fn min_bytes_per_line(&self, width: u32) -> usize {
        (width as usize * self.bits_per_pixel()).div_ceil(8)
    }

    /// Whether the format carries an alpha channel
    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelFormat::Argb32
                | PixelFormat::Argb32Premultiplied
                | PixelFormat::Rgba8888
                | PixelFormat::Rgba64
        )
    }

    /// One of the three 32-bit `0xAARRGGBB` layouts
    pub fn is_argb32_family(&self) -> bool {
        matches!(
            self,
            PixelFormat::Rgb32 | PixelFormat::Argb32 | PixelFormat::Argb32Premultiplied
        )
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Encoded image container used for round trips, loading and saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Lossless PNG
    #[default]
    Png,
    /// Lossy JPEG, alpha is dropped
    Jpeg,
    /// Uncompressed BMP
    Bmp,
    /// Lossless WebP
    Webp,
}

impl ContainerFormat {
    /// Returns the container name as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Png => "png",
            ContainerFormat::Jpeg => "jpeg",
            ContainerFormat::Bmp => "bmp",
            ContainerFormat::Webp => "webp",
        }
    }

    /// Parses a container name such as `"PNG"`, `"jpg"` or `"webp"`
    ///
    /// # Examples
    ///
    /// ```
    /// use pixmat::model::ContainerFormat;
    ///
    /// assert_eq!(ContainerFormat::from_name("JPG"), Some(ContainerFormat::Jpeg));
    /// assert_eq!(ContainerFormat::from_name("tga"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Some(ContainerFormat::Png),
            "jpeg" | "jpg" => Some(ContainerFormat::Jpeg),
            "bmp" => Some(ContainerFormat::Bmp),
            "webp" => Some(ContainerFormat::Webp),
            _ => None,
        }
    }

    /// Guesses the container from a file extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// The matching `image` crate format
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            ContainerFormat::Png => image::ImageFormat::Png,
            ContainerFormat::Jpeg => image::ImageFormat::Jpeg,
            ContainerFormat::Bmp => image::ImageFormat::Bmp,
            ContainerFormat::Webp => image::ImageFormat::WebP,
        }
    }

    /// Whether a decode of this container returns exactly what was encoded
    pub fn is_lossless(&self) -> bool {
        !matches!(self, ContainerFormat::Jpeg)
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContainerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            format!("Invalid container format '{}'. Must be png, jpeg, bmp or webp", s)
        })
    }
}

/// Integer point in global or screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Creates a new point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer rectangle
///
/// A negative `width` or `height` in a capture request means "extend to the
/// edge of the screen", see [`Rect::resolve_within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the left edge
    pub x:      i32,
    /// Y coordinate of the top edge
    pub y:      i32,
    /// Width in pixels
    pub width:  i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle
    ///
    /// # Examples
    ///
    /// ```
    /// use pixmat::model::{Point, Rect};
    ///
    /// let rect = Rect::new(10, 20, 100, 50);
    /// assert!(rect.contains(Point::new(10, 20)));
    /// assert!(!rect.contains(Point::new(110, 20)));
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `point` lies inside the rectangle (right/bottom edges excluded)
    pub fn contains(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.x
            && point.y >= self.y
            && (point.x as i64) < self.x as i64 + self.width as i64
            && (point.y as i64) < self.y as i64 + self.height as i64
    }

    /// Resolves a capture request against a `width` x `height` surface
    ///
    /// Negative extents are replaced by the distance to the surface edge, then
    /// the result is clipped to the surface. Returns `None` when nothing of
    /// the request overlaps the surface.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixmat::model::Rect;
    ///
    /// // -1 extents grab to the edge
    /// let r = Rect::new(100, 50, -1, -1).resolve_within(1920, 1080).unwrap();
    /// assert_eq!(r, Rect::new(100, 50, 1820, 1030));
    ///
    /// // Overhanging requests are clipped
    /// let r = Rect::new(1900, 0, 100, 10).resolve_within(1920, 1080).unwrap();
    /// assert_eq!(r, Rect::new(1900, 0, 20, 10));
    /// ```
    pub fn resolve_within(&self, width: u32, height: u32) -> Option<Rect> {
        let surface_w = width.min(i32::MAX as u32) as i64;
        let surface_h = height.min(i32::MAX as u32) as i64;

        let x = self.x as i64;
        let y = self.y as i64;
        let w = if self.width < 0 { surface_w - x } else { self.width as i64 };
        let h = if self.height < 0 { surface_h - y } else { self.height as i64 };

        let left = x.max(0);
        let top = y.max(0);
        let right = (x + w).min(surface_w);
        let bottom = (y + h).min(surface_h);

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(
            left as i32,
            top as i32,
            (right - left) as i32,
            (bottom - top) as i32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_serialization() {
        assert_eq!(serde_json::to_string(&PixelFormat::Rgb888).unwrap(), r#""rgb888""#);
        assert_eq!(
            serde_json::to_string(&PixelFormat::Argb32Premultiplied).unwrap(),
            r#""argb32_premultiplied""#
        );
        assert_eq!(
            serde_json::from_str::<PixelFormat>(r#""rgba64""#).unwrap(),
            PixelFormat::Rgba64
        );
    }

    #[test]
    fn test_pixel_format_display_matches_serde() {
        for format in [
            PixelFormat::Invalid,
            PixelFormat::Grayscale8,
            PixelFormat::Argb32Premultiplied,
            PixelFormat::Rgba64,
        ] {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json.trim_matches('"'), format.to_string());
        }
    }

    #[test]
    fn test_bits_per_pixel() {
        assert_eq!(PixelFormat::Grayscale8.bits_per_pixel(), 8);
        assert_eq!(PixelFormat::Rgb888.bits_per_pixel(), 24);
        assert_eq!(PixelFormat::Rgb32.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::Rgba64.bits_per_pixel(), 64);
        assert_eq!(PixelFormat::Mono.bits_per_pixel(), 1);
    }

    #[test]
    fn test_min_bytes_per_line() {
        assert_eq!(PixelFormat::Rgb888.min_bytes_per_line(2), 6);
        assert_eq!(PixelFormat::Mono.min_bytes_per_line(9), 2);
        assert_eq!(PixelFormat::Rgba64.min_bytes_per_line(3), 24);
        assert_eq!(PixelFormat::Invalid.min_bytes_per_line(100), 0);
    }

    #[test]
    fn test_argb32_family() {
        assert!(PixelFormat::Rgb32.is_argb32_family());
        assert!(PixelFormat::Argb32Premultiplied.is_argb32_family());
        assert!(!PixelFormat::Rgba8888.is_argb32_family());
        assert!(!PixelFormat::Rgb32.has_alpha());
        assert!(PixelFormat::Argb32.has_alpha());
    }

    #[test]
    fn test_container_format_parsing() {
        assert_eq!("PNG".parse::<ContainerFormat>().unwrap(), ContainerFormat::Png);
        assert_eq!("jpg".parse::<ContainerFormat>().unwrap(), ContainerFormat::Jpeg);
        assert_eq!(" bmp ".parse::<ContainerFormat>().unwrap(), ContainerFormat::Bmp);
        assert!("gif".parse::<ContainerFormat>().is_err());
    }

    #[test]
    fn test_container_format_from_path() {
        let path = std::path::Path::new("/tmp/shot.WEBP");
        assert_eq!(ContainerFormat::from_path(path), Some(ContainerFormat::Webp));
        assert_eq!(ContainerFormat::from_path(std::path::Path::new("noext")), None);
        assert!(!ContainerFormat::Jpeg.is_lossless());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(-1920, 0, 1920, 1080);
        assert!(rect.contains(Point::new(-1, 0)));
        assert!(!rect.contains(Point::new(0, 0)));
        assert!(!Rect::new(0, 0, 0, 10).contains(Point::new(0, 0)));
    }

    #[test]
    fn test_rect_resolve_within() {
        let full = Rect::new(0, 0, -1, -1).resolve_within(640, 480).unwrap();
        assert_eq!(full, Rect::new(0, 0, 640, 480));

        let negative_origin = Rect::new(-10, -10, 20, 20).resolve_within(640, 480).unwrap();
        assert_eq!(negative_origin, Rect::new(0, 0, 10, 10));

        assert!(Rect::new(700, 0, 10, 10).resolve_within(640, 480).is_none());
        assert!(Rect::new(0, 0, 0, 10).resolve_within(640, 480).is_none());
    }
}
