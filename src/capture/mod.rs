//! Screen grabbing
//!
//! Grabs a rectangle of the screen that shows a given widget. The screen
//! is located by the widget's top-level window position; when no screen
//! contains that point the first screen is used.
//!
//! Screens come from a [`ScreenProvider`]:
//!
//! - [`MockScreens`]: synthetic screens for tests and headless use
//! - [`XcapScreens`]: real monitors via `xcap` (feature `xcap-backend`)
//!
//! # Examples
//!
//! ```
//! use pixmat::{
//!     capture::{MockScreens, grab_image},
//!     model::{Point, Rect},
//! };
//!
//! let screens = MockScreens::new();
//! let window = Point::new(100, 100);
//!
//! // -1 extents grab to the screen edge
//! let img = grab_image(&window, Rect::new(0, 0, -1, -1), &screens);
//! assert_eq!(img.dimensions(), (1920, 1080));
//! ```

use tracing::{debug, warn};

use crate::{
    buffer::{ImageBuffer, Pixmap},
    error::{BridgeError, BridgeResult},
    model::{Point, Rect},
};

pub mod mock;
#[cfg(all(
    feature = "xcap-backend",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
))]
pub mod xcap_backend;

pub use mock::MockScreens;
#[cfg(all(
    feature = "xcap-backend",
    any(target_os = "linux", target_os = "windows", target_os = "macos")
))]
pub use xcap_backend::XcapScreens;

/// One physical display
pub trait Screen {
    /// Human-readable display name
    fn name(&self) -> String;

    /// Position and size in global desktop coordinates
    fn geometry(&self) -> Rect;

    /// Grabs `region`, given relative to this screen's top-left corner
    ///
    /// The region has already been clipped to the screen.
    fn grab(&self, region: Rect) -> BridgeResult<ImageBuffer>;
}

/// Source of the screens attached to the desktop
pub trait ScreenProvider: Send + Sync {
    /// All screens, primary first
    fn screens(&self) -> BridgeResult<Vec<Box<dyn Screen>>>;

    /// Provider name for log messages
    fn name(&self) -> &'static str;
}

/// Anything that lives in a top-level window
pub trait Widget {
    /// Global position of the widget's top-level window
    fn window_pos(&self) -> Point;
}

impl Widget for Point {
    fn window_pos(&self) -> Point {
        *self
    }
}

/// Picks the screen containing `pos`, falling back to the first screen
pub fn screen_at(screens: &[Box<dyn Screen>], pos: Point) -> Option<&dyn Screen> {
    screens
        .iter()
        .find(|s| s.geometry().contains(pos))
        .or_else(|| screens.first())
        .map(|s| &**s)
}

/// Grabs `rect` from the screen showing `widget`
///
/// `rect` is relative to the chosen screen. Negative width or height extend
/// to the screen edge, and the rectangle is clipped to the screen.
///
/// # Errors
///
/// - [`BridgeError::NoScreens`] when the provider reports no screens
/// - [`BridgeError::InvalidParameter`] when `rect` misses the screen
/// - Provider and grab failures as reported by the provider
pub fn try_grab_image(
    widget: &dyn Widget,
    rect: Rect,
    provider: &dyn ScreenProvider,
) -> BridgeResult<ImageBuffer> {
    let screens = provider.screens()?;
    let pos = widget.window_pos();
    let screen = screen_at(&screens, pos).ok_or(BridgeError::NoScreens)?;

    let geometry = screen.geometry();
    let region = rect
        .resolve_within(geometry.width.max(0) as u32, geometry.height.max(0) as u32)
        .ok_or_else(|| BridgeError::InvalidParameter {
            parameter: "region".to_string(),
            reason:    format!("{:?} does not overlap screen '{}' ({:?})", rect, screen.name(), geometry),
        })?;

    debug!(
        "Grabbing {:?} from screen '{}' via {} (window at {},{})",
        region,
        screen.name(),
        provider.name(),
        pos.x,
        pos.y
    );
    screen.grab(region)
}

/// Grabs `rect` from the screen showing `widget`, warning and returning a
/// null buffer on failure
pub fn grab_image(widget: &dyn Widget, rect: Rect, provider: &dyn ScreenProvider) -> ImageBuffer {
    try_grab_image(widget, rect, provider).unwrap_or_else(|e| {
        warn!("Screen grab failed: {}", e);
        ImageBuffer::default()
    })
}

/// Same as [`grab_image`], converted for display
pub fn grab_pixmap(widget: &dyn Widget, rect: Rect, provider: &dyn ScreenProvider) -> Pixmap {
    Pixmap::from_image(&grab_image(widget, rect, provider))
}

/// Creates the screen provider for the current build
///
/// Returns [`XcapScreens`] when built with the `xcap-backend` feature on
/// Linux, Windows or macOS, and [`BridgeError::BackendNotAvailable`]
/// otherwise.
pub fn create_default_provider() -> BridgeResult<Box<dyn ScreenProvider>> {
    #[cfg(all(
        feature = "xcap-backend",
        any(target_os = "linux", target_os = "windows", target_os = "macos")
    ))]
    {
        Ok(Box::new(XcapScreens::new()))
    }

    #[cfg(not(all(
        feature = "xcap-backend",
        any(target_os = "linux", target_os = "windows", target_os = "macos")
    )))]
    {
        Err(BridgeError::BackendNotAvailable {
            backend: "xcap".to_string(),
        })
    }
}
