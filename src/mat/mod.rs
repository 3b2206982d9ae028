//! Vision-side pixel matrix
//!
//! [`Mat`] mirrors the matrix header of a computer-vision library: rows,
//! columns, a byte stride and an element type over a block of bytes. The
//! bytes are a `Cow`, which makes the two construction modes explicit:
//!
//! - [`Mat::view`] borrows existing pixel memory (zero copy). The lifetime
//!   ties the view to its source, so it can never outlive it.
//! - [`Mat::new`], [`Mat::from_vec`] and [`Mat::decode_color`] own their
//!   bytes and are `Mat<'static>`.
//!
//! Writing through a view detaches it into an owned copy first; the source
//! memory is never modified.
//!
//! # Examples
//!
//! ```
//! use pixmat::mat::{ColorConversion, ElemType, Mat};
//!
//! let pixels = [255u8, 0, 0, 255, 0, 0];
//! let mut mat = Mat::view(1, 2, ElemType::U8C3, &pixels, 6).unwrap();
//! assert!(mat.is_view());
//!
//! mat.cvt_color(ColorConversion::RgbToBgr).unwrap();
//! assert!(!mat.is_view());
//! assert_eq!(mat.pixel(0, 1), &[0, 0, 255]);
//! assert_eq!(pixels[0], 255);
//! ```

use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

pub mod filter;

/// Element type of a matrix: sample depth and channel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElemType {
    /// 8-bit, 1 channel
    #[default]
    U8C1,
    /// 8-bit, 2 channels
    U8C2,
    /// 8-bit, 3 channels
    U8C3,
    /// 8-bit, 4 channels
    U8C4,
    /// 16-bit, 1 channel
    U16C1,
    /// 16-bit, 3 channels
    U16C3,
    /// 16-bit, 4 channels
    U16C4,
}

impl ElemType {
    /// Conventional short name, e.g. `"8UC3"`
    pub fn as_str(&self) -> &'static str {
        match self {
            ElemType::U8C1 => "8UC1",
            ElemType::U8C2 => "8UC2",
            ElemType::U8C3 => "8UC3",
            ElemType::U8C4 => "8UC4",
            ElemType::U16C1 => "16UC1",
            ElemType::U16C3 => "16UC3",
            ElemType::U16C4 => "16UC4",
        }
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> usize {
        match self {
            ElemType::U8C1 | ElemType::U16C1 => 1,
            ElemType::U8C2 => 2,
            ElemType::U8C3 | ElemType::U16C3 => 3,
            ElemType::U8C4 | ElemType::U16C4 => 4,
        }
    }

    /// Bytes per channel sample
    pub fn depth_bytes(&self) -> usize {
        match self {
            ElemType::U8C1 | ElemType::U8C2 | ElemType::U8C3 | ElemType::U8C4 => 1,
            ElemType::U16C1 | ElemType::U16C3 | ElemType::U16C4 => 2,
        }
    }

    /// Bytes per element (all channels of one pixel)
    pub fn elem_size(&self) -> usize {
        self.channels() * self.depth_bytes()
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// In-place channel reorders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorConversion {
    /// 3 channels, R,G,B to B,G,R
    RgbToBgr,
    /// 3 channels, B,G,R to R,G,B
    BgrToRgb,
    /// 4 channels, R,G,B,A to B,G,R,A
    RgbaToBgra,
    /// 4 channels, B,G,R,A to R,G,B,A
    BgraToRgba,
}

impl ColorConversion {
    /// Channel count the conversion expects
    pub fn channels(&self) -> usize {
        match self {
            ColorConversion::RgbToBgr | ColorConversion::BgrToRgb => 3,
            ColorConversion::RgbaToBgra | ColorConversion::BgraToRgba => 4,
        }
    }
}

/// Pixel matrix over borrowed or owned bytes
#[derive(Clone, Default)]
pub struct Mat<'a> {
    rows:      usize,
    cols:      usize,
    step:      usize,
    elem_type: ElemType,
    data:      Cow<'a, [u8]>,
}

fn required_len(rows: usize, cols: usize, step: usize, elem_type: ElemType) -> usize {
    if rows == 0 || cols == 0 {
        return 0;
    }
    (rows - 1) * step + cols * elem_type.elem_size()
}

fn validate(
    rows: usize,
    cols: usize,
    step: usize,
    elem_type: ElemType,
    len: usize,
) -> BridgeResult<usize> {
    let row_bytes = cols * elem_type.elem_size();
    if step < row_bytes {
        return Err(BridgeError::InvalidParameter {
            parameter: "step".to_string(),
            reason:    format!("Step {} is shorter than one row ({} bytes)", step, row_bytes),
        });
    }
    let expected = required_len(rows, cols, step, elem_type);
    if len < expected {
        return Err(BridgeError::BufferTooSmall {
            expected,
            actual: len,
        });
    }
    Ok(expected)
}

impl Mat<'static> {
    /// Creates a zero-filled, continuous matrix
    pub fn new(rows: usize, cols: usize, elem_type: ElemType) -> Self {
        let step = cols * elem_type.elem_size();
        Self {
            rows,
            cols,
            step,
            elem_type,
            data: Cow::Owned(vec![0; rows * step]),
        }
    }

    /// Takes ownership of `data` laid out with `step` bytes per row
    pub fn from_vec(
        rows: usize,
        cols: usize,
        elem_type: ElemType,
        data: Vec<u8>,
        step: usize,
    ) -> BridgeResult<Self> {
        validate(rows, cols, step, elem_type, data.len())?;
        Ok(Self {
            rows,
            cols,
            step,
            elem_type,
            data: Cow::Owned(data),
        })
    }

    /// Decodes PNG/JPEG/BMP/WebP bytes as a 3-channel BGR matrix
    ///
    /// Alpha is dropped and gray images are expanded, so the result is always
    /// [`ElemType::U8C3`] in B, G, R order.
    pub fn decode_color(bytes: &[u8]) -> BridgeResult<Self> {
        if bytes.is_empty() {
            return Err(BridgeError::DecodingFailed {
                reason: "no bytes to decode".to_string(),
            });
        }
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut raw = rgb.into_raw();
        raw.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));

        let cols = width as usize;
        Self::from_vec(height as usize, cols, ElemType::U8C3, raw, cols * 3)
    }
}

impl<'a> Mat<'a> {
    /// Zero-copy view over `data` laid out with `step` bytes per row
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidParameter`] when `step` is shorter than a row,
    /// [`BridgeError::BufferTooSmall`] when `data` cannot hold every row.
    pub fn view(
        rows: usize,
        cols: usize,
        elem_type: ElemType,
        data: &'a [u8],
        step: usize,
    ) -> BridgeResult<Self> {
        let needed = validate(rows, cols, step, elem_type, data.len())?;
        Ok(Self {
            rows,
            cols,
            step,
            elem_type,
            data: Cow::Borrowed(&data[..needed]),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Bytes between the starts of two consecutive rows
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn elem_type(&self) -> ElemType {
        self.elem_type
    }

    pub fn channels(&self) -> usize {
        self.elem_type.channels()
    }

    /// Number of elements (rows * cols)
    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether the matrix has no elements
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0 || self.data.is_empty()
    }

    /// Whether the matrix still borrows someone else's memory
    pub fn is_view(&self) -> bool {
        matches!(self.data, Cow::Borrowed(_))
    }

    /// Whether rows follow each other without padding
    pub fn is_continuous(&self) -> bool {
        self.step == self.cols * self.elem_type.elem_size()
    }

    /// Raw bytes, including row padding
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.step;
        start..start + self.cols * self.elem_type.elem_size()
    }

    /// Element bytes of row `row`, without padding
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub fn row(&self, row: usize) -> &[u8] {
        assert!(row < self.rows, "row {} out of range ({} rows)", row, self.rows);
        &self.data[self.row_range(row)]
    }

    /// Mutable element bytes of row `row`; detaches a view first
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        assert!(row < self.rows, "row {} out of range ({} rows)", row, self.rows);
        let range = self.row_range(row);
        &mut self.data.to_mut()[range]
    }

    /// Bytes of the element at (`row`, `col`)
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    pub fn pixel(&self, row: usize, col: usize) -> &[u8] {
        assert!(col < self.cols, "col {} out of range ({} cols)", col, self.cols);
        let size = self.elem_type.elem_size();
        &self.row(row)[col * size..(col + 1) * size]
    }

    /// Channel samples of a 16-bit element as native-endian words
    ///
    /// Returns `None` for 8-bit matrices.
    pub fn pixel_u16(&self, row: usize, col: usize) -> Option<Vec<u16>> {
        if self.elem_type.depth_bytes() != 2 {
            return None;
        }
        Some(
            self.pixel(row, col)
                .chunks_exact(2)
                .map(|w| u16::from_ne_bytes([w[0], w[1]]))
                .collect(),
        )
    }

    /// Converts into an owned matrix, copying a view's bytes
    pub fn into_owned(self) -> Mat<'static> {
        Mat {
            rows:      self.rows,
            cols:      self.cols,
            step:      self.step,
            elem_type: self.elem_type,
            data:      Cow::Owned(self.data.into_owned()),
        }
    }

    /// Deep, continuous copy
    pub fn clone_owned(&self) -> Mat<'static> {
        if self.is_empty() {
            return Mat {
                elem_type: self.elem_type,
                ..Mat::default()
            };
        }
        let packed: Vec<u8> = (0..self.rows).flat_map(|r| self.row(r).iter().copied()).collect();
        Mat {
            rows:      self.rows,
            cols:      self.cols,
            step:      self.cols * self.elem_type.elem_size(),
            elem_type: self.elem_type,
            data:      Cow::Owned(packed),
        }
    }

    /// Exchanges channels `a` and `b` of every element in place
    ///
    /// Whole samples are exchanged, so 16-bit words keep their byte order.
    pub fn swap_channels(&mut self, a: usize, b: usize) -> BridgeResult<()> {
        let channels = self.channels();
        if a >= channels || b >= channels {
            return Err(BridgeError::InvalidParameter {
                parameter: "channel".to_string(),
                reason:    format!(
                    "Channels {} and {} do not exist in a {} matrix",
                    a, b, self.elem_type
                ),
            });
        }
        if a == b || self.is_empty() {
            return Ok(());
        }

        let depth = self.elem_type.depth_bytes();
        let size = self.elem_type.elem_size();
        for r in 0..self.rows {
            for px in self.row_mut(r).chunks_exact_mut(size) {
                for k in 0..depth {
                    px.swap(a * depth + k, b * depth + k);
                }
            }
        }
        Ok(())
    }

    /// Applies a channel reorder in place
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnsupportedElemType`] when the channel count does not
    /// match the conversion.
    pub fn cvt_color(&mut self, code: ColorConversion) -> BridgeResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        if self.channels() != code.channels() {
            return Err(BridgeError::UnsupportedElemType {
                elem_type: self.elem_type,
            });
        }
        // Every supported reorder exchanges the first and third channel.
        self.swap_channels(0, 2)
    }
}

impl fmt::Debug for Mat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mat")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("step", &self.step)
            .field("elem_type", &self.elem_type)
            .field("view", &self.is_view())
            .finish()
    }
}
