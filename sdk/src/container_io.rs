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

//! Contracts between the container core and its format-specific
//! collaborators.
//!
//! The core treats a container format as a capability tag: one shared,
//! invariant-enforcing [`Container`](crate::Container) is parameterized by
//! [`ContainerFormat`], and format-specific parse, serialize, and signing
//! behavior is supplied as an injected [`ContainerBackend`] strategy rather
//! than a type hierarchy.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sigdoc_status_tracker::{LogItem, StatusTracker};

use crate::{
    data_file::DataFile,
    signature::{ProductionPlace, Signature, SignatureProfile},
    signing::DigestAlgorithm,
    Result,
};

/// Persisted representation of a container.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ContainerFormat {
    /// Legacy DIGIDOC-XML container.
    #[serde(rename = "DDOC")]
    DDoc,

    /// ASiC-E (BDOC) container: ZIP packaging with XAdES signatures.
    #[serde(rename = "ASICE")]
    AsicE,
}

impl ContainerFormat {
    /// Conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::DDoc => "ddoc",
            ContainerFormat::AsicE => "asice",
        }
    }

    /// Guess the format from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .as_deref()
        {
            Some("ddoc") => Some(ContainerFormat::DDoc),
            Some("asice") | Some("sce") | Some("bdoc") => Some(ContainerFormat::AsicE),
            _ => None,
        }
    }
}

/// Everything a format backend recovers from an existing container file in
/// one shot.
#[derive(Clone, Debug, Default)]
pub struct ParsedContainer {
    /// Data files, in container order.
    pub data_files: Vec<DataFile>,

    /// Signatures, in container order.
    pub signatures: Vec<Signature>,

    /// Diagnostics recorded while parsing. A
    /// [`Fatal`](sigdoc_status_tracker::LogKind::Fatal) item means the
    /// container cannot be meaningfully signature-checked.
    pub open_log: StatusTracker,
}

/// Inputs a format backend needs to build the to-be-signed structure for a
/// new signature.
#[derive(Clone, Debug)]
pub struct SignatureRequest {
    /// The signer's certificate (DER).
    pub certificate: Vec<u8>,

    /// Claimed signer roles, in order.
    pub signer_roles: Vec<String>,

    /// Place of signing, as claimed by the signer.
    pub production_place: ProductionPlace,

    /// Requested signature profile.
    pub profile: SignatureProfile,

    /// Digest algorithm the signer will be asked to apply.
    pub digest_algorithm: DigestAlgorithm,
}

/// A signature prepared by the format backend but not yet signed.
#[derive(Clone, Debug)]
pub struct PreparedSignature {
    /// Id the finished signature will carry, unique within the container.
    pub id: String,

    /// Canonical signed-info representation; these are the exact bytes
    /// handed to the signer.
    pub signed_info: Vec<u8>,

    /// The request this signature was prepared from.
    pub request: SignatureRequest,
}

/// Format-specific parse, serialize, and signing behavior for one
/// [`ContainerFormat`].
///
/// Implementations hold no reference to any particular container; all
/// state travels through the call arguments.
pub trait ContainerBackend: Send + Sync {
    /// The format this backend implements.
    fn format(&self) -> ContainerFormat;

    /// Parse an existing container file.
    ///
    /// Recoverable problems are reported through
    /// [`ParsedContainer::open_log`] (fatal ones with
    /// [`LogKind::Fatal`](sigdoc_status_tracker::LogKind::Fatal)); this
    /// function fails only when nothing at all could be read.
    fn open(&self, path: &Path) -> Result<ParsedContainer>;

    /// Parse a pre-built signature and bind it to the given data files.
    ///
    /// Fails with [`Error::MalformedSignature`](crate::Error::MalformedSignature)
    /// when the bytes cannot be parsed in this format.
    fn parse_signature(&self, bytes: &[u8], data_files: &[DataFile]) -> Result<Signature>;

    /// Serialize the container state to `path`.
    fn write(&self, data_files: &[DataFile], signatures: &[Signature], path: &Path) -> Result<()>;

    /// Build the to-be-signed structure for a new signature over the given
    /// data files. The data files are hashed in container order.
    fn prepare_signature(
        &self,
        data_files: &[DataFile],
        request: SignatureRequest,
    ) -> Result<PreparedSignature>;

    /// Attach the raw signature value produced by the signer to a prepared
    /// signature.
    fn complete_signature(
        &self,
        prepared: PreparedSignature,
        signature_value: Vec<u8>,
    ) -> Result<Signature>;

    /// Confirm or augment a completed signature (time-stamp, time-mark,
    /// revocation data) as the requested profile demands.
    ///
    /// Failures must propagate to the caller; a signature whose
    /// confirmation failed is never attached to the container.
    fn confirm_signature(&self, signature: &mut Signature) -> Result<()> {
        let _ = signature;
        Ok(())
    }
}

/// Structural and cryptographic verification of one signature.
///
/// Verification output is data: the verifier reports each condition as a
/// [`LogItem`] and never fails outright.
pub trait SignatureVerifier: Send + Sync {
    /// Verify one signature against the container's data files.
    ///
    /// `strict` requests the format's strictest checking level. The
    /// returned items preserve the order in which conditions were found.
    fn verify(&self, signature: &Signature, data_files: &[DataFile], strict: bool) -> Vec<LogItem>;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn format_from_path() {
        assert_eq!(
            ContainerFormat::from_path(&PathBuf::from("doc.ddoc")),
            Some(ContainerFormat::DDoc)
        );
        assert_eq!(
            ContainerFormat::from_path(&PathBuf::from("doc.asice")),
            Some(ContainerFormat::AsicE)
        );
        assert_eq!(
            ContainerFormat::from_path(&PathBuf::from("doc.BDOC")),
            Some(ContainerFormat::AsicE)
        );
        assert_eq!(ContainerFormat::from_path(&PathBuf::from("doc.zip")), None);
    }
}
