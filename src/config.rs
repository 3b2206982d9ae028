//! Compiled defaults and environment overrides for encoding.
//!
//! # Runtime Configuration
//!
//! | Environment Variable | Default | Description |
//! |---------------------|---------|-------------|
//! | `PIXMAT_JPEG_QUALITY` | 75 | JPEG quality (1-100) |
//! | `PIXMAT_PNG_QUALITY` | 50 | PNG quality, mapped to a compression level |
//! | `PIXMAT_ROUNDTRIP_FORMAT` | png | Container used by the CLI `roundtrip` command |
//!
//! Unparseable or out-of-range values fall back to the default.

use crate::model::ContainerFormat;

/// Default JPEG quality, the usual toolkit default for `save()` with no
/// explicit quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Default PNG quality. 34-66 maps to the balanced compression level.
pub const DEFAULT_PNG_QUALITY: u8 = 50;

/// Default container for encode/decode round trips.
pub const DEFAULT_ROUNDTRIP_FORMAT: ContainerFormat = ContainerFormat::Png;

fn get_quality_from_env(env_var: &str, default: u8) -> u8 {
    std::env::var(env_var)
        .ok()
        .and_then(|s| s.trim().parse::<u8>().ok())
        .filter(|q| *q <= 100)
        .unwrap_or(default)
}

/// JPEG quality, checking `PIXMAT_JPEG_QUALITY`.
///
/// ```bash
/// export PIXMAT_JPEG_QUALITY=90
/// ```
pub fn jpeg_quality() -> u8 {
    get_quality_from_env("PIXMAT_JPEG_QUALITY", DEFAULT_JPEG_QUALITY).max(1)
}

/// PNG quality, checking `PIXMAT_PNG_QUALITY`.
pub fn png_quality() -> u8 {
    get_quality_from_env("PIXMAT_PNG_QUALITY", DEFAULT_PNG_QUALITY)
}

/// Round-trip container, checking `PIXMAT_ROUNDTRIP_FORMAT`.
pub fn roundtrip_format() -> ContainerFormat {
    std::env::var("PIXMAT_ROUNDTRIP_FORMAT")
        .ok()
        .and_then(|s| ContainerFormat::from_name(&s))
        .unwrap_or(DEFAULT_ROUNDTRIP_FORMAT)
}
