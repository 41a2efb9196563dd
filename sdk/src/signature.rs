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

use crate::{Error, Result};

/// Signature level, naming the long-term-validation elements a signature is
/// expected to contain.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SignatureProfile {
    /// Basic electronic signature without revocation data.
    #[serde(rename = "B_BES")]
    BBes,

    /// Long-term signature with time-stamp and revocation data.
    #[serde(rename = "LT")]
    Lt,

    /// Long-term signature with time-mark.
    #[serde(rename = "LT_TM")]
    LtTm,

    /// Long-term archival signature.
    #[serde(rename = "LTA")]
    Lta,
}

/// Place where a signature was given, as claimed by the signer.
///
/// All fields are optional; an absent field is simply not asserted.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProductionPlace {
    /// City of signing.
    pub city: Option<String>,

    /// State or province of signing.
    pub state_or_province: Option<String>,

    /// Country of signing.
    pub country: Option<String>,

    /// Postal code of the signing location.
    pub postal_code: Option<String>,
}

/// One signature over a container's data files.
///
/// A `Signature` belongs to exactly one [`Container`](crate::Container);
/// it is created by signing or reconstructed by the format backend when an
/// existing container is opened.
///
/// A signature without an embedded signing certificate is a valid but
/// lower-trust state. Use [`try_resolve()`](Self::try_resolve) for a view
/// that is guaranteed to carry the certificate.
#[derive(Clone, Debug)]
pub struct Signature {
    id: String,
    profile: SignatureProfile,
    signing_certificate: Option<Vec<u8>>,
    ca_certificates: Vec<Vec<u8>>,
    signer_roles: Vec<String>,
    production_place: ProductionPlace,
    value: Vec<u8>,
}

impl Signature {
    /// Create an empty signature with the given id and profile.
    ///
    /// Used by format backends when reconstructing or completing
    /// signatures; application code receives signatures from
    /// [`Container`](crate::Container) operations.
    pub fn new(id: impl Into<String>, profile: SignatureProfile) -> Self {
        Signature {
            id: id.into(),
            profile,
            signing_certificate: None,
            ca_certificates: Vec::new(),
            signer_roles: Vec::new(),
            production_place: ProductionPlace::default(),
            value: Vec::new(),
        }
    }

    /// Set the signing certificate (DER).
    #[must_use]
    pub fn with_certificate(mut self, der: Vec<u8>) -> Self {
        self.signing_certificate = Some(der);
        self
    }

    /// Set the intermediate CA certificates (DER), in chain order.
    #[must_use]
    pub fn with_ca_certificates(mut self, ders: Vec<Vec<u8>>) -> Self {
        self.ca_certificates = ders;
        self
    }

    /// Set the claimed signer roles, in order.
    #[must_use]
    pub fn with_signer_roles(mut self, roles: Vec<String>) -> Self {
        self.signer_roles = roles;
        self
    }

    /// Set the production place.
    #[must_use]
    pub fn with_production_place(mut self, place: ProductionPlace) -> Self {
        self.production_place = place;
        self
    }

    /// Set the raw signature value.
    #[must_use]
    pub fn with_value(mut self, value: Vec<u8>) -> Self {
        self.value = value;
        self
    }

    /// Returns the id of this signature, unique within its container.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the signature profile.
    pub fn profile(&self) -> SignatureProfile {
        self.profile
    }

    /// Returns the embedded signing certificate (DER), if any.
    pub fn signing_certificate(&self) -> Option<&[u8]> {
        self.signing_certificate.as_deref()
    }

    /// Returns the certificate chain presented by this signature: the
    /// signing certificate (if present) followed by intermediates in order.
    pub fn certificate_chain(&self) -> Vec<&[u8]> {
        self.signing_certificate
            .iter()
            .chain(self.ca_certificates.iter())
            .map(|der| der.as_slice())
            .collect()
    }

    /// Returns the claimed signer roles, in order.
    pub fn signer_roles(&self) -> &[String] {
        &self.signer_roles
    }

    /// Returns the place where the signature was given.
    pub fn production_place(&self) -> &ProductionPlace {
        &self.production_place
    }

    /// Returns the raw signature value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Maps this signature to a view that is guaranteed to carry its signing
    /// certificate.
    ///
    /// Fails with [`Error::NotResolvable`] when the signature has no
    /// embedded certificate value. Callers must handle that case explicitly;
    /// such a signature is still validated, but it is reported distinctly
    /// and never silently treated as certificate-bearing.
    pub fn try_resolve(&self) -> Result<ResolvedSignature<'_>> {
        match self.signing_certificate.as_deref() {
            Some(certificate) => Ok(ResolvedSignature {
                signature: self,
                certificate,
            }),
            None => Err(Error::NotResolvable(self.id.clone())),
        }
    }
}

/// A view of a [`Signature`] that is guaranteed to carry its signing
/// certificate.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedSignature<'a> {
    signature: &'a Signature,
    certificate: &'a [u8],
}

impl<'a> ResolvedSignature<'a> {
    /// Returns the underlying signature.
    pub fn signature(&self) -> &'a Signature {
        self.signature
    }

    /// Returns the signing certificate (DER).
    pub fn certificate(&self) -> &'a [u8] {
        self.certificate
    }
}
