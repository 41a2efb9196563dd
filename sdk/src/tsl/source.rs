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

use std::{collections::HashSet, sync::RwLock};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};
use x509_parser::{pem::Pem, prelude::*};

use super::{read_lock, write_lock, TslError};

/// A set of trust anchors a signature's certificate chain may terminate at.
///
/// One source instance is shared (behind an `Arc`) by every validation
/// running against the same loaded trusted list. Anchors can be added or
/// removed on the live set, which is primarily useful for tests and for
/// deployments pinning ad-hoc roots.
#[derive(Debug, Default)]
pub struct TslCertificateSource {
    inner: RwLock<Anchors>,
}

#[derive(Debug, Default)]
struct Anchors {
    /// Anchor certificates in DER form, insertion order.
    ders: Vec<Vec<u8>>,

    /// Base-64 encoded SHA-256 over each anchor's DER form, for O(1)
    /// membership tests.
    identities: HashSet<String>,
}

impl TslCertificateSource {
    /// Create an empty trust-anchor set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load anchors from a PEM certificate bundle.
    ///
    /// `location` only labels the error when the bundle cannot be parsed
    /// or holds no certificates.
    pub fn from_pem_bundle(bundle: &[u8], location: &str) -> Result<Self, TslError> {
        let source = Self::new();

        for maybe_pem in Pem::iter_from_buffer(bundle) {
            match maybe_pem {
                Ok(pem) => source.add_certificate(pem.contents),
                Err(e) => {
                    return Err(TslError::MalformedTrustList {
                        location: location.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if source.is_empty() {
            return Err(TslError::MalformedTrustList {
                location: location.to_string(),
                message: "document contains no certificates".to_string(),
            });
        }

        Ok(source)
    }

    /// Add a trust anchor (DER). Duplicates are ignored.
    pub fn add_certificate(&self, der: Vec<u8>) {
        let identity = cert_identity(&der);
        let mut anchors = write_lock(&self.inner);
        if anchors.identities.insert(identity) {
            anchors.ders.push(der);
        }
    }

    /// Remove a trust anchor. Returns `true` if it was present.
    pub fn remove_certificate(&self, der: &[u8]) -> bool {
        let identity = cert_identity(der);
        let mut anchors = write_lock(&self.inner);
        if anchors.identities.remove(&identity) {
            anchors.ders.retain(|existing| existing != der);
            true
        } else {
            false
        }
    }

    /// Returns `true` if the given certificate (DER) is an anchor.
    pub fn contains(&self, der: &[u8]) -> bool {
        read_lock(&self.inner).identities.contains(&cert_identity(der))
    }

    /// Returns a snapshot of the anchor certificates (DER), in insertion
    /// order.
    pub fn certificates(&self) -> Vec<Vec<u8>> {
        read_lock(&self.inner).ders.clone()
    }

    /// Number of anchors in the set.
    pub fn len(&self) -> usize {
        read_lock(&self.inner).ders.len()
    }

    /// Returns `true` if the set holds no anchors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluate whether a certificate chain is anchored in this set.
    ///
    /// A chain is anchored when any of its certificates is itself an
    /// anchor, or when the chain's terminal certificate was issued by an
    /// anchor (matched by distinguished name). Cryptographic verification
    /// of each link is the signature verifier's concern, not this set's.
    pub fn is_chain_anchored(&self, chain: &[&[u8]]) -> bool {
        if chain.iter().any(|der| self.contains(der)) {
            return true;
        }

        let Some(last) = chain.last() else {
            return false;
        };
        let Ok((_, terminal)) = X509Certificate::from_der(last) else {
            return false;
        };

        let issuer_raw = terminal.issuer().as_raw();
        let anchors = read_lock(&self.inner);
        anchors.ders.iter().any(|der| {
            X509Certificate::from_der(der)
                .map(|(_, anchor)| anchor.subject().as_raw() == issuer_raw)
                .unwrap_or(false)
        })
    }
}

fn cert_identity(der: &[u8]) -> String {
    BASE64.encode(Sha256::digest(der))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const ROOT_PEM: &[u8] = include_bytes!("../../tests/fixtures/certs/root.pem");
    const LEAF_PEM: &[u8] = include_bytes!("../../tests/fixtures/certs/leaf.pem");
    const OTHER_ROOT_PEM: &[u8] = include_bytes!("../../tests/fixtures/certs/other_root.pem");

    fn der_of(pem: &[u8]) -> Vec<u8> {
        Pem::iter_from_buffer(pem).next().unwrap().unwrap().contents
    }

    #[test]
    fn add_and_remove() {
        let source = TslCertificateSource::new();
        let root = der_of(ROOT_PEM);

        source.add_certificate(root.clone());
        source.add_certificate(root.clone()); // duplicate ignored
        assert_eq!(source.len(), 1);
        assert!(source.contains(&root));

        assert!(source.remove_certificate(&root));
        assert!(!source.remove_certificate(&root));
        assert!(source.is_empty());
    }

    #[test]
    fn from_pem_bundle_loads_all_certificates() {
        let mut bundle = ROOT_PEM.to_vec();
        bundle.extend_from_slice(OTHER_ROOT_PEM);

        let source = TslCertificateSource::from_pem_bundle(&bundle, "test-bundle").unwrap();
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn empty_bundle_is_malformed() {
        let result = TslCertificateSource::from_pem_bundle(b"not a pem", "test-bundle");
        assert!(matches!(result, Err(TslError::MalformedTrustList { .. })));
    }

    #[test]
    fn direct_anchor_membership() {
        let source = TslCertificateSource::new();
        let root = der_of(ROOT_PEM);
        source.add_certificate(root.clone());

        assert!(source.is_chain_anchored(&[root.as_slice()]));
    }

    #[test]
    fn chain_anchored_through_issuer() {
        let source = TslCertificateSource::new();
        source.add_certificate(der_of(ROOT_PEM));

        // The leaf is not an anchor, but its issuer is.
        let leaf = der_of(LEAF_PEM);
        assert!(source.is_chain_anchored(&[leaf.as_slice()]));
    }

    #[test]
    fn unrelated_chain_is_not_anchored() {
        let source = TslCertificateSource::new();
        source.add_certificate(der_of(OTHER_ROOT_PEM));

        let leaf = der_of(LEAF_PEM);
        assert!(!source.is_chain_anchored(&[leaf.as_slice()]));
        assert!(!source.is_chain_anchored(&[]));
    }
}
