//! Mock screen provider for testing
//!
//! [`MockScreens`] reports a configurable set of synthetic screens. Grabs
//! return a crop of a test pattern the size of the screen, so tests can
//! check screen selection and rectangle handling without a display server.
//!
//! # Features
//!
//! - **Configurable Layout:** Any number of screens at arbitrary desktop
//!   positions, including negative coordinates
//! - **Error Injection:** Fail screen enumeration, or fail every grab
//!
//! # Examples
//!
//! ```
//! use pixmat::{
//!     capture::{MockScreens, ScreenProvider},
//!     error::BridgeError,
//!     model::Rect,
//! };
//!
//! let screens = MockScreens::empty()
//!     .with_screen("Left", Rect::new(-1280, 0, 1280, 1024))
//!     .with_screen("Right", Rect::new(0, 0, 1920, 1080));
//! assert_eq!(screens.screens().unwrap().len(), 2);
//!
//! let broken = MockScreens::new().with_error(BridgeError::NoScreens);
//! assert!(broken.screens().is_err());
//! ```

use super::{Screen, ScreenProvider};
use crate::{
    buffer::ImageBuffer,
    error::{BridgeError, BridgeResult},
    model::Rect,
};

/// Synthetic screen returned by [`MockScreens`]
#[derive(Debug, Clone)]
pub struct MockScreen {
    name:       String,
    geometry:   Rect,
    grab_error: Option<String>,
}

impl Screen for MockScreen {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn geometry(&self) -> Rect {
        self.geometry
    }

    fn grab(&self, region: Rect) -> BridgeResult<ImageBuffer> {
        if let Some(reason) = &self.grab_error {
            return Err(BridgeError::CaptureFailed {
                screen: self.name.clone(),
                reason: reason.clone(),
            });
        }
        let full = ImageBuffer::from_test_pattern(
            self.geometry.width.max(0) as u32,
            self.geometry.height.max(0) as u32,
        );
        full.crop(region)
    }
}

/// Mock screen provider for testing and headless use
#[derive(Debug)]
pub struct MockScreens {
    /// Screens in reporting order
    screens:         Vec<MockScreen>,
    /// Optional error returned by enumeration
    error_injection: Option<BridgeError>,
    /// Optional failure reason for every grab
    grab_error:      Option<String>,
}

impl MockScreens {
    /// Single 1920x1080 screen named `Mock-0` at the desktop origin
    pub fn new() -> Self {
        Self::empty().with_screen("Mock-0", Rect::new(0, 0, 1920, 1080))
    }

    /// Provider that reports no screens at all
    pub fn empty() -> Self {
        Self {
            screens:         Vec::new(),
            error_injection: None,
            grab_error:      None,
        }
    }

    /// Appends a screen with the given desktop geometry
    pub fn with_screen(mut self, name: &str, geometry: Rect) -> Self {
        self.screens.push(MockScreen {
            name: name.to_string(),
            geometry,
            grab_error: None,
        });
        self
    }

    /// Injects an error returned by every enumeration
    pub fn with_error(mut self, error: BridgeError) -> Self {
        self.error_injection = Some(error);
        self
    }

    /// Makes every grab fail with [`BridgeError::CaptureFailed`]
    pub fn with_grab_error(mut self, reason: &str) -> Self {
        self.grab_error = Some(reason.to_string());
        self
    }

    /// Checks if an error should be injected
    fn check_error_injection(&self) -> BridgeResult<()> {
        let Some(error) = &self.error_injection else {
            return Ok(());
        };
        // BridgeError is not Clone because of io::Error
        Err(match error {
            BridgeError::UnsupportedFormat { format } => {
                BridgeError::UnsupportedFormat { format: *format }
            }
            BridgeError::UnsupportedElemType { elem_type } => BridgeError::UnsupportedElemType {
                elem_type: *elem_type,
            },
            BridgeError::InvalidParameter { parameter, reason } => BridgeError::InvalidParameter {
                parameter: parameter.clone(),
                reason:    reason.clone(),
            },
            BridgeError::BufferTooSmall { expected, actual } => BridgeError::BufferTooSmall {
                expected: *expected,
                actual:   *actual,
            },
            BridgeError::EncodingFailed { format, reason } => BridgeError::EncodingFailed {
                format: format.clone(),
                reason: reason.clone(),
            },
            BridgeError::DecodingFailed { reason } => BridgeError::DecodingFailed {
                reason: reason.clone(),
            },
            BridgeError::NoScreens => BridgeError::NoScreens,
            BridgeError::CaptureFailed { screen, reason } => BridgeError::CaptureFailed {
                screen: screen.clone(),
                reason: reason.clone(),
            },
            BridgeError::BackendNotAvailable { backend } => BridgeError::BackendNotAvailable {
                backend: backend.clone(),
            },
            BridgeError::IoError(e) => {
                BridgeError::IoError(std::io::Error::new(e.kind(), e.to_string()))
            }
            BridgeError::ImageError(msg) => BridgeError::ImageError(msg.clone()),
        })
    }
}

impl Default for MockScreens {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenProvider for MockScreens {
    fn screens(&self) -> BridgeResult<Vec<Box<dyn Screen>>> {
        self.check_error_injection()?;
        Ok(self
            .screens
            .iter()
            .map(|s| {
                Box::new(MockScreen {
                    grab_error: self.grab_error.clone(),
                    ..s.clone()
                }) as Box<dyn Screen>
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
