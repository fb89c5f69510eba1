//! Asset version fingerprinting.
//!
//! The version token summarizes the bytes under a fixed, ordered set of asset
//! directories. Clients send back the token they loaded with; a mismatch on a
//! GET navigation forces a full reload (see [`crate::server::negotiate`]).
//!
//! # Algorithm
//!
//! ```text
//! hash(dir)   = H( concat( for entry in read_dir(dir):
//!                             dir?  -> hash(entry)
//!                             file? -> H(bytes(entry)) ) )
//! version     = H( concat( hash(d) for d in configured dirs ) )
//! ```
//!
//! `H` is SHA-256 rendered as lowercase hex. Entries are concatenated in the
//! order the filesystem enumerates them, not sorted, so the token is stable for
//! an unchanged tree on one host but is not portable across filesystems.
//!
//! There is no caching here: every call walks the trees again. A
//! [`VersionCell`] keeps the result for one request so the render helper and
//! the response hook share a single walk.

use crate::error::{InertiaError, Result};
use crate::protocol::constants::NO_VERSIONING;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Fingerprint configuration: whether versioning is on, and which directories to hash.
///
/// Paths must already be resolved (aliases and environment variables
/// expanded); see [`crate::InertiaConfig::resolved_assets_dirs`].
#[derive(Clone, Debug)]
pub struct Fingerprint {
    enabled: bool,
    dirs: Arc<[PathBuf]>,
}

impl Fingerprint {
    /// Fingerprint over `dirs`, hashed in the given order.
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            enabled: true,
            dirs: dirs.into_iter().collect(),
        }
    }

    /// Fingerprint that always yields [`NO_VERSIONING`].
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            dirs: Arc::from(Vec::new()),
        }
    }

    /// Whether versioning is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured directories.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Compute the version token, blocking on filesystem I/O.
    pub fn compute(&self) -> Result<String> {
        if !self.enabled {
            return Ok(NO_VERSIONING.to_string());
        }
        compute_version(&self.dirs)
    }

    /// Compute the version token on the blocking thread pool.
    pub async fn compute_async(&self) -> Result<String> {
        if !self.enabled {
            return Ok(NO_VERSIONING.to_string());
        }
        let dirs = Arc::clone(&self.dirs);
        tokio::task::spawn_blocking(move || compute_version(&dirs))
            .await
            .map_err(|e| InertiaError::Config(format!("fingerprint task failed: {e}")))?
    }
}

/// Hash every configured directory and combine the results.
///
/// An unreadable directory or file aborts the whole computation; there is no
/// partial or best-effort token.
pub fn compute_version(dirs: &[PathBuf]) -> Result<String> {
    let mut combined = String::with_capacity(dirs.len() * 64);
    for dir in dirs {
        combined.push_str(&hash_directory(dir)?);
    }
    let version = hex::encode(Sha256::digest(combined.as_bytes()));
    tracing::debug!(dirs = dirs.len(), %version, "computed asset version");
    Ok(version)
}

/// Recursively hash a single directory.
pub fn hash_directory(dir: &Path) -> Result<String> {
    let entries = fs::read_dir(dir).map_err(|e| InertiaError::asset_dir(dir, e))?;

    let mut combined = String::new();
    for entry in entries {
        let entry = entry.map_err(|e| InertiaError::asset_dir(dir, e))?;
        let path = entry.path();
        // Follows symlinks, so a linked directory is hashed as a directory.
        let metadata = fs::metadata(&path).map_err(|e| InertiaError::asset_dir(&path, e))?;

        if metadata.is_dir() {
            combined.push_str(&hash_directory(&path)?);
        } else {
            combined.push_str(&hash_file(&path)?);
        }
    }

    Ok(hex::encode(Sha256::digest(combined.as_bytes())))
}

fn hash_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| InertiaError::asset_dir(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| InertiaError::asset_dir(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Request-lifetime cache for the version token.
///
/// Cloning shares the cell. The first caller computes; later callers in the
/// same request reuse the value. A failed computation is not cached.
#[derive(Clone, Debug)]
pub struct VersionCell {
    fingerprint: Fingerprint,
    value: Arc<OnceCell<String>>,
}

impl VersionCell {
    /// Empty cell for one request.
    #[must_use]
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            value: Arc::new(OnceCell::new()),
        }
    }

    /// The version token, computing it on first use.
    pub async fn get(&self) -> Result<String> {
        self.value
            .get_or_try_init(|| self.fingerprint.compute_async())
            .await
            .cloned()
    }

    /// The token if it was already computed in this request.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.value.get().map(String::as_str)
    }
}
