//! Packaged resources
//!
//! A [`ResourceSet`] maps `:/`-prefixed paths to bytes compiled into the
//! binary. Paths without the prefix are read from the filesystem, so the
//! same call site works for packaged and on-disk images.
//!
//! # Examples
//!
//! ```
//! use pixmat::resource::ResourceSet;
//!
//! let resources = ResourceSet::bundled();
//! let mat = resources.load_mat(":/pixmat/sample.png");
//! assert_eq!((mat.rows(), mat.cols()), (16, 16));
//!
//! assert!(resources.load_mat(":/pixmat/missing.png").is_empty());
//! ```

use std::{
    borrow::Cow,
    collections::HashMap,
    path::Path,
    sync::OnceLock,
};

use tracing::debug;

use crate::{
    error::{BridgeError, BridgeResult},
    mat::Mat,
};

/// Prefix that marks a packaged resource path
pub const RESOURCE_PREFIX: &str = ":/";

/// 16x16 RGB gradient shipped with the crate
const SAMPLE_PNG: &[u8] = include_bytes!("../assets/sample.png");

/// Set of packaged resources with filesystem fallback
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    entries: HashMap<String, Cow<'static, [u8]>>,
}

impl ResourceSet {
    /// Creates an empty set; only filesystem paths resolve
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources compiled into the crate
    ///
    /// Contains `:/pixmat/sample.png`.
    pub fn bundled() -> &'static ResourceSet {
        static BUNDLED: OnceLock<ResourceSet> = OnceLock::new();
        BUNDLED.get_or_init(|| ResourceSet::new().with_resource(":/pixmat/sample.png", SAMPLE_PNG))
    }

    /// Registers `bytes` under `path`
    ///
    /// The `:/` prefix is added when missing.
    pub fn with_resource(mut self, path: &str, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Registers `bytes` under `path`, replacing any previous entry
    pub fn insert(&mut self, path: &str, bytes: impl Into<Cow<'static, [u8]>>) {
        let key = if path.starts_with(RESOURCE_PREFIX) {
            path.to_string()
        } else {
            format!("{}{}", RESOURCE_PREFIX, path.trim_start_matches('/'))
        };
        self.entries.insert(key, bytes.into());
    }

    /// Whether a packaged resource exists under `path`
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Packaged resource paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Reads the raw bytes behind `path`
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidParameter`] for an unknown `:/` path
    /// - [`BridgeError::IoError`] when the file cannot be read
    pub fn read(&self, path: impl AsRef<Path>) -> BridgeResult<Cow<'_, [u8]>> {
        let path = path.as_ref();
        if let Some(name) = path.to_str().filter(|p| p.starts_with(RESOURCE_PREFIX)) {
            return self
                .entries
                .get(name)
                .map(|bytes| Cow::Borrowed(bytes.as_ref()))
                .ok_or_else(|| BridgeError::InvalidParameter {
                    parameter: "path".to_string(),
                    reason:    format!("No packaged resource named '{}'", name),
                });
        }
        Ok(Cow::Owned(std::fs::read(path)?))
    }

    /// Reads and decodes `path` as a 3-channel BGR matrix
    ///
    /// Any read or decode failure yields an empty matrix.
    pub fn load_mat(&self, path: impl AsRef<Path>) -> Mat<'static> {
        let path = path.as_ref();
        match self.read(path).and_then(|bytes| Mat::decode_color(&bytes)) {
            Ok(mat) => mat,
            Err(e) => {
                debug!("Resource {} not loaded: {}", path.display(), e);
                Mat::default()
            }
        }
    }
}
