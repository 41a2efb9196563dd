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

use serde::{Deserialize, Serialize};

use crate::{
    configuration::Configuration,
    container_io::{ContainerBackend, SignatureRequest},
    data_file::DataFile,
    signature::{ProductionPlace, Signature},
    Error, Result,
};

/// Digest algorithm a signer is asked to apply.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DigestAlgorithm {
    /// SHA-1. Kept for legacy DDOC containers only.
    #[serde(rename = "SHA1")]
    Sha1,

    /// SHA-256.
    #[serde(rename = "SHA256")]
    Sha256,

    /// SHA-512.
    #[serde(rename = "SHA512")]
    Sha512,
}

impl DigestAlgorithm {
    /// The XML-DSig algorithm identifier for this digest.
    pub fn xml_id(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "http://www.w3.org/2000/09/xmldsig#sha1",
            DigestAlgorithm::Sha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
            DigestAlgorithm::Sha512 => "http://www.w3.org/2001/04/xmlenc#sha512",
        }
    }
}

/// Boxed error type returned by [`Signer`] implementations.
pub type SignerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The `Signer` trait produces a raw signature value over a byte array.
///
/// This trait exists to allow the signature mechanism to be extended:
/// smart cards, HSMs, and remote signing services all implement the same
/// capability.
pub trait Signer {
    /// Sign `data` with the given digest algorithm, returning the raw
    /// signature bytes.
    fn sign(&self, digest_algorithm: DigestAlgorithm, data: &[u8])
        -> std::result::Result<Vec<u8>, SignerError>;

    /// Returns the signer's certificate (DER).
    fn certificate(&self) -> std::result::Result<Vec<u8>, SignerError>;

    /// Returns the claimed signer roles, in order.
    fn signer_roles(&self) -> Vec<String> {
        Vec::new()
    }

    /// City of signing, if claimed.
    fn city(&self) -> Option<String> {
        None
    }

    /// State or province of signing, if claimed.
    fn state_or_province(&self) -> Option<String> {
        None
    }

    /// Country of signing, if claimed.
    fn country(&self) -> Option<String> {
        None
    }

    /// Postal code of the signing location, if claimed.
    fn postal_code(&self) -> Option<String> {
        None
    }
}

/// Create one signature over `data_files` with the given signer.
///
/// On success the finished signature is returned for the caller to attach;
/// on any failure nothing is retained, so the container gains exactly one
/// signature on success and zero otherwise.
pub(crate) fn create_signature(
    backend: &dyn ContainerBackend,
    data_files: &[DataFile],
    signer: &dyn Signer,
    config: &Configuration,
) -> Result<Signature> {
    if data_files.is_empty() {
        return Err(Error::EmptyContainer);
    }

    let certificate = signer.certificate().map_err(Error::SigningFailed)?;

    let request = SignatureRequest {
        certificate,
        signer_roles: signer.signer_roles(),
        production_place: ProductionPlace {
            city: signer.city(),
            state_or_province: signer.state_or_province(),
            country: signer.country(),
            postal_code: signer.postal_code(),
        },
        profile: config.signature_profile,
        digest_algorithm: config.signature_digest_algorithm,
    };

    let digest_algorithm = request.digest_algorithm;
    let prepared = backend.prepare_signature(data_files, request)?;

    let value = signer
        .sign(digest_algorithm, &prepared.signed_info)
        .map_err(Error::SigningFailed)?;

    let mut signature = backend.complete_signature(prepared, value)?;

    // A signature whose confirmation failed is never attached.
    backend.confirm_signature(&mut signature)?;

    log::debug!("created signature {}", signature.id());
    Ok(signature)
}
