//! Screen provider backed by `xcap`
//!
//! Each [`xcap::Monitor`] becomes one [`Screen`]. Monitors are enumerated
//! on every call to [`ScreenProvider::screens`], so hot-plugged displays
//! show up without restarting.
//!
//! `xcap` captures whole monitors; the requested region is cropped out of
//! the captured frame. On scaled displays the frame is in physical pixels,
//! so the region is clipped against the frame size as well.

use tracing::{debug, error, warn};

use super::{Screen, ScreenProvider};
use crate::{
    buffer::ImageBuffer,
    error::{BridgeError, BridgeResult},
    model::Rect,
};

/// Screen provider for real monitors
#[derive(Debug, Default)]
pub struct XcapScreens;

impl XcapScreens {
    pub fn new() -> Self {
        Self
    }
}

/// One monitor reported by xcap
pub struct XcapScreen {
    name:     String,
    geometry: Rect,
    monitor:  xcap::Monitor,
}

impl std::fmt::Debug for XcapScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XcapScreen")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .finish()
    }
}

/// Maps xcap errors to BridgeError with a hint about the likely cause
fn map_xcap_error(screen: &str, e: impl std::fmt::Display) -> BridgeError {
    let reason = e.to_string();
    let lower = reason.to_lowercase();

    if lower.contains("permission") || lower.contains("denied") {
        warn!("xcap permission denied - check screen recording permissions");
    } else if lower.contains("display") || lower.contains("connection") {
        warn!("xcap failed to reach the display server - verify DISPLAY/WAYLAND_DISPLAY");
    } else {
        error!("xcap error: {}", reason);
    }

    BridgeError::CaptureFailed {
        screen: screen.to_string(),
        reason,
    }
}

impl XcapScreen {
    fn from_monitor(monitor: xcap::Monitor) -> BridgeResult<Self> {
        let name = monitor.name().map_err(|e| map_xcap_error("<unknown>", e))?;
        let x = monitor.x().map_err(|e| map_xcap_error(&name, e))?;
        let y = monitor.y().map_err(|e| map_xcap_error(&name, e))?;
        let width = monitor.width().map_err(|e| map_xcap_error(&name, e))?;
        let height = monitor.height().map_err(|e| map_xcap_error(&name, e))?;

        Ok(Self {
            geometry: Rect::new(x, y, width.min(i32::MAX as u32) as i32, height.min(i32::MAX as u32) as i32),
            name,
            monitor,
        })
    }
}

impl Screen for XcapScreen {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn geometry(&self) -> Rect {
        self.geometry
    }

    fn grab(&self, region: Rect) -> BridgeResult<ImageBuffer> {
        debug!("xcap capturing monitor '{}'", self.name);
        let frame = self
            .monitor
            .capture_image()
            .map_err(|e| map_xcap_error(&self.name, e))?;
        let (width, height) = (frame.width(), frame.height());

        let rgba = image::RgbaImage::from_raw(width, height, frame.into_raw()).ok_or_else(|| {
            BridgeError::CaptureFailed {
                screen: self.name.clone(),
                reason: "captured frame is shorter than its dimensions".to_string(),
            }
        })?;
        let full = ImageBuffer::from_dynamic(image::DynamicImage::ImageRgba8(rgba));

        let region = region
            .resolve_within(width, height)
            .ok_or_else(|| BridgeError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!("{:?} lies outside the {}x{} frame", region, width, height),
            })?;
        full.crop(region)
    }
}

impl ScreenProvider for XcapScreens {
    fn screens(&self) -> BridgeResult<Vec<Box<dyn Screen>>> {
        let monitors = xcap::Monitor::all().map_err(|e| map_xcap_error("<all>", e))?;
        debug!("xcap reported {} monitors", monitors.len());

        let mut screens: Vec<Box<dyn Screen>> = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let primary = monitor.is_primary().unwrap_or(false);
            let screen = Box::new(XcapScreen::from_monitor(monitor)?);
            if primary {
                screens.insert(0, screen);
            } else {
                screens.push(screen);
            }
        }
        Ok(screens)
    }

    fn name(&self) -> &'static str {
        "xcap"
    }
}
