// Copyright 2024 Sigdoc contributors. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::{
    fs,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, RwLock,
    },
    time::{Duration, SystemTime},
};

use sha2::{Digest, Sha256};
use x509_parser::pem::Pem;

use super::{
    fetch::{PemTrustListFetcher, TrustListFetcher},
    mutex_lock, read_lock,
    source::TslCertificateSource,
    write_lock, TslError,
};
use crate::configuration::Configuration;

/// Caches the trusted certificate set loaded from a configuration's TSL
/// source.
///
/// Exactly one cache is live per [`Configuration`] instance; it copies the
/// values it needs at construction and is destroyed with the configuration
/// that owns it.
///
/// [`get()`](Self::get) before the cache expires returns the same
/// [`Arc`] instance, so callers can rely on pointer identity to detect
/// that no refresh happened. Concurrent `get()` calls on an unloaded cache
/// perform exactly one underlying fetch.
///
/// Alongside the in-memory entry, the fetched document is cached on disk —
/// one file per source location, named deterministically — with the file
/// modification time as the freshness signal compared against the
/// configured expiration.
pub struct TslCache {
    location: String,
    expiration: Duration,
    keystore_location: PathBuf,
    cache_dir: PathBuf,
    fetcher: Box<dyn TrustListFetcher>,

    state: RwLock<Option<LoadedTsl>>,

    // Serializes the load/refresh path; readers of an already-loaded cache
    // never take this lock.
    load_lock: Mutex<()>,

    override_source: RwLock<Option<Arc<TslCertificateSource>>>,
    bypass_disk_cache: AtomicBool,
}

#[derive(Clone)]
struct LoadedTsl {
    source: Arc<TslCertificateSource>,
    loaded_at: SystemTime,
}

impl TslCache {
    /// Create a cache for the given configuration, using the built-in
    /// [`PemTrustListFetcher`].
    pub fn new(config: &Configuration) -> Self {
        Self::with_fetcher(config, Box::new(PemTrustListFetcher::new(config)))
    }

    /// Create a cache with a caller-supplied fetcher. This is how
    /// deployments consuming cryptographically signed list formats plug in
    /// their own transport and integrity verification.
    pub fn with_fetcher(config: &Configuration, fetcher: Box<dyn TrustListFetcher>) -> Self {
        TslCache {
            location: config.tsl_location.clone(),
            expiration: config.tsl_cache_expiration,
            keystore_location: config.tsl_keystore_location.clone(),
            cache_dir: config.tsl_cache_dir.clone(),
            fetcher,
            state: RwLock::new(None),
            load_lock: Mutex::new(()),
            override_source: RwLock::new(None),
            bypass_disk_cache: AtomicBool::new(false),
        }
    }

    /// Returns the current trusted set, loading it on first use.
    ///
    /// While the cache is fresh this returns the same `Arc` instance on
    /// every call. Once the entry is older than the configured expiration,
    /// the next call re-fetches and returns a new instance.
    pub fn get(&self) -> Result<Arc<TslCertificateSource>, TslError> {
        if let Some(tsl) = read_lock(&self.override_source).clone() {
            return Ok(tsl);
        }

        if let Some(loaded) = read_lock(&self.state).clone() {
            if !self.is_expired(&loaded) {
                return Ok(loaded.source);
            }
        }

        self.load()
    }

    /// Re-fetches the trusted set if it is due.
    ///
    /// Calling this before the cache expires is a safe no-op: the same
    /// instance is returned and no fetch happens. After expiry (or after
    /// [`invalidate_cache()`](Self::invalidate_cache)) the set is fetched
    /// again, re-verified, and the on-disk cache rewritten with a strictly
    /// later modification time.
    pub fn refresh(&self) -> Result<Arc<TslCertificateSource>, TslError> {
        if let Some(tsl) = read_lock(&self.override_source).clone() {
            return Ok(tsl);
        }

        if let Some(loaded) = read_lock(&self.state).clone() {
            if !self.is_expired(&loaded) && !self.bypass_disk_cache.load(Ordering::Acquire) {
                return Ok(loaded.source);
            }
        }

        self.load()
    }

    /// Forces the next [`get()`](Self::get) or [`refresh()`](Self::refresh)
    /// to bypass the on-disk cache freshness check and re-fetch
    /// unconditionally.
    pub fn invalidate_cache(&self) {
        self.bypass_disk_cache.store(true, Ordering::Release);
        *write_lock(&self.state) = None;
    }

    /// Install a caller-supplied trust set, bypassing loading entirely.
    ///
    /// `set_tsl(None)` evicts the override; the next access serves the
    /// lazily loaded configuration-driven set again.
    pub fn set_tsl(&self, source: Option<TslCertificateSource>) {
        *write_lock(&self.override_source) = source.map(Arc::new);
    }

    /// Time of the last completed load, if any.
    ///
    /// Not affected by [`set_tsl`](Self::set_tsl) overrides.
    pub fn loaded_at(&self) -> Option<SystemTime> {
        read_lock(&self.state).as_ref().map(|loaded| loaded.loaded_at)
    }

    /// The on-disk cache file for this cache's source location.
    pub fn cache_file_path(&self) -> PathBuf {
        let digest = hex::encode(Sha256::digest(self.location.as_bytes()));
        self.cache_dir.join(format!("tsl-{digest}.cache"))
    }

    fn is_expired(&self, loaded: &LoadedTsl) -> bool {
        loaded
            .loaded_at
            .elapsed()
            .map(|age| age >= self.expiration)
            .unwrap_or(true)
    }

    fn load(&self) -> Result<Arc<TslCertificateSource>, TslError> {
        let _guard = mutex_lock(&self.load_lock);

        // Another caller may have completed the load while we waited.
        if !self.bypass_disk_cache.load(Ordering::Acquire) {
            if let Some(loaded) = read_lock(&self.state).clone() {
                if !self.is_expired(&loaded) {
                    return Ok(loaded.source);
                }
            }
        }

        let document = self.load_document()?;
        let source = Arc::new(TslCertificateSource::from_pem_bundle(
            &document,
            &self.location,
        )?);

        *write_lock(&self.state) = Some(LoadedTsl {
            source: source.clone(),
            loaded_at: SystemTime::now(),
        });

        log::info!(
            "trusted list loaded from {} ({} certificate(s))",
            self.location,
            source.len()
        );
        Ok(source)
    }

    fn load_document(&self) -> Result<Vec<u8>, TslError> {
        let cache_file = self.cache_file_path();

        if !self.bypass_disk_cache.load(Ordering::Acquire) {
            if let Some(document) = self.read_disk_cache(&cache_file) {
                return Ok(document);
            }
        }

        let document = self.fetcher.fetch(&self.location)?;
        let keystore = self.read_keystore()?;
        self.fetcher
            .verify_integrity(&document, &keystore)
            .map_err(|e| TslError::IntegrityCheckFailed {
                message: e.to_string(),
            })?;

        self.write_disk_cache(&cache_file, &document);
        self.bypass_disk_cache.store(false, Ordering::Release);
        Ok(document)
    }

    fn read_disk_cache(&self, path: &std::path::Path) -> Option<Vec<u8>> {
        let modified = fs::metadata(path).ok()?.modified().ok()?;
        let age = modified.elapsed().ok()?;
        if age < self.expiration {
            fs::read(path).ok()
        } else {
            None
        }
    }

    // Cache-write failures are not fatal: the next access re-fetches.
    fn write_disk_cache(&self, path: &std::path::Path, document: &[u8]) {
        let previous = fs::metadata(path).ok().and_then(|m| m.modified().ok());

        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                log::warn!("could not create TSL cache directory {}: {e}", dir.display());
                return;
            }
        }

        if let Err(e) = fs::write(path, document) {
            log::warn!("could not write TSL cache file {}: {e}", path.display());
            return;
        }

        // The modification time is the freshness signal; it must strictly
        // advance across refreshes even on filesystems with coarse
        // timestamp resolution.
        if let Some(previous) = previous {
            if let Ok(file) = fs::File::open(path) {
                let stale = file
                    .metadata()
                    .and_then(|m| m.modified())
                    .map(|m| m <= previous)
                    .unwrap_or(false);
                if stale {
                    let _ = file.set_modified(previous + Duration::from_millis(10));
                }
            }
        }
    }

    fn read_keystore(&self) -> Result<Vec<Vec<u8>>, TslError> {
        let not_found = || TslError::KeyStoreNotFound {
            path: self.keystore_location.display().to_string(),
        };

        let bytes = fs::read(&self.keystore_location).map_err(|_| not_found())?;

        let mut certs = Vec::new();
        for maybe_pem in Pem::iter_from_buffer(&bytes) {
            match maybe_pem {
                Ok(pem) => certs.push(pem.contents),
                Err(_) => return Err(not_found()),
            }
        }

        if certs.is_empty() {
            return Err(not_found());
        }
        Ok(certs)
    }
}
