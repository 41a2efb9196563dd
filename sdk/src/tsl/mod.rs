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

//! Trusted-list (TSL) loading, caching, and chain-trust evaluation.
//!
//! A [`TslCache`] is created from one
//! [`Configuration`](crate::Configuration) and serves the trusted
//! certificate set loaded from that configuration's TSL source, refreshing
//! it when the cache expires. The loaded set is a
//! [`TslCertificateSource`], which answers whether a signature's
//! certificate chain is anchored in the trusted set.

mod cache;
mod fetch;
mod source;

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

pub use cache::TslCache;
pub use fetch::{IntegrityError, PemTrustListFetcher, TrustListFetcher};
pub use source::TslCertificateSource;

/// Describes errors that can occur while loading or refreshing a trusted
/// list.
///
/// Network failures ([`SourceUnavailable`](Self::SourceUnavailable)) may be
/// retried by the caller. Integrity failures
/// ([`IntegrityCheckFailed`](Self::IntegrityCheckFailed)) must not be: the
/// list was fetched but its own signature did not verify against the
/// configured keystore.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TslError {
    /// The trusted list's own integrity signature failed verification
    /// against the configured keystore.
    #[error("trusted list failed integrity check: {message}")]
    IntegrityCheckFailed {
        /// The underlying verifier's message.
        message: String,
    },

    /// The trusted-list source could not be reached or read.
    #[error("trusted list source unavailable: {location}")]
    SourceUnavailable {
        /// The source location that could not be read.
        location: String,
        /// The underlying transport or I/O error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// The configured TSL keystore is missing or holds no usable
    /// certificates.
    #[error("TSL keystore not found: {path}")]
    KeyStoreNotFound {
        /// The keystore path that could not be used.
        path: String,
    },

    /// The fetched trust-list document could not be parsed.
    #[error("malformed trusted list from {location}: {message}")]
    MalformedTrustList {
        /// The source location the document came from.
        location: String,
        /// What went wrong while parsing.
        message: String,
    },
}

// Poisoned locks only occur after a panic in another thread; recovering the
// inner value keeps the cache usable for remaining threads.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn mutex_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|e| e.into_inner())
}
