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

//! Mock collaborators shared by the unit tests.

use std::{
    fs,
    io::{Error as IoError, ErrorKind},
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use sigdoc_status_tracker::{log_item, validation_codes, LogItem, LogKind, StatusTracker};

use crate::{
    container_io::{
        ContainerBackend, ContainerFormat, ParsedContainer, PreparedSignature, SignatureRequest,
        SignatureVerifier,
    },
    data_file::DataFile,
    signature::Signature,
    signing::{DigestAlgorithm, Signer, SignerError},
    Error, Result,
};

pub(crate) fn parsed_container_with(
    data_files: Vec<DataFile>,
    signatures: Vec<Signature>,
    open_log: StatusTracker,
) -> ParsedContainer {
    ParsedContainer {
        data_files,
        signatures,
        open_log,
    }
}

/// In-memory stand-in for a format backend.
///
/// Raw signatures are any byte string starting with `SIG:`; the remainder
/// becomes the signature id. Prepared signatures get sequential `S{n}` ids.
pub(crate) struct TestBackend {
    pub open_template: Option<ParsedContainer>,
    pub fail_confirm: bool,
    pub fail_write: bool,
    pub next_id: AtomicUsize,
}

impl TestBackend {
    pub fn new() -> Self {
        TestBackend {
            open_template: None,
            fail_confirm: false,
            fail_write: false,
            next_id: AtomicUsize::new(0),
        }
    }
}

impl ContainerBackend for TestBackend {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::AsicE
    }

    fn open(&self, path: &Path) -> Result<ParsedContainer> {
        self.open_template
            .clone()
            .ok_or_else(|| Error::MalformedContainer(path.display().to_string()))
    }

    fn parse_signature(&self, bytes: &[u8], _data_files: &[DataFile]) -> Result<Signature> {
        match bytes.strip_prefix(b"SIG:") {
            Some(id) => Ok(Signature::new(
                String::from_utf8_lossy(id).into_owned(),
                crate::SignatureProfile::Lt,
            )
            .with_value(bytes.to_vec())),
            None => Err(Error::MalformedSignature(
                "missing SIG: prefix".to_string(),
            )),
        }
    }

    fn write(&self, data_files: &[DataFile], signatures: &[Signature], path: &Path) -> Result<()> {
        if self.fail_write {
            return Err(Error::Persistence(Box::new(IoError::new(
                ErrorKind::PermissionDenied,
                "write refused",
            ))));
        }
        let marker = format!("files={} signatures={}", data_files.len(), signatures.len());
        fs::write(path, marker)?;
        Ok(())
    }

    fn prepare_signature(
        &self,
        data_files: &[DataFile],
        request: SignatureRequest,
    ) -> Result<PreparedSignature> {
        let id = format!("S{}", self.next_id.fetch_add(1, Ordering::SeqCst));

        let mut signed_info = request.digest_algorithm.xml_id().as_bytes().to_vec();
        for data_file in data_files {
            signed_info.extend_from_slice(data_file.name().as_bytes());
            signed_info.extend_from_slice(&data_file.bytes()?);
        }

        Ok(PreparedSignature {
            id,
            signed_info,
            request,
        })
    }

    fn complete_signature(
        &self,
        prepared: PreparedSignature,
        signature_value: Vec<u8>,
    ) -> Result<Signature> {
        Ok(Signature::new(prepared.id, prepared.request.profile)
            .with_certificate(prepared.request.certificate)
            .with_signer_roles(prepared.request.signer_roles)
            .with_production_place(prepared.request.production_place)
            .with_value(signature_value))
    }

    fn confirm_signature(&self, _signature: &mut Signature) -> Result<()> {
        if self.fail_confirm {
            return Err(Error::SigningFailed(Box::new(IoError::new(
                ErrorKind::TimedOut,
                "time-stamp authority unreachable",
            ))));
        }
        Ok(())
    }
}

/// Signer returning fixed bytes, with switchable failure modes.
pub(crate) struct TestSigner {
    pub certificate: Vec<u8>,
    pub roles: Vec<String>,
    pub city: Option<String>,
    pub fail_sign: bool,
}

impl Default for TestSigner {
    fn default() -> Self {
        TestSigner {
            certificate: b"test-certificate-der".to_vec(),
            roles: Vec::new(),
            city: None,
            fail_sign: false,
        }
    }
}

impl Signer for TestSigner {
    fn sign(
        &self,
        _digest_algorithm: DigestAlgorithm,
        data: &[u8],
    ) -> std::result::Result<Vec<u8>, SignerError> {
        if self.fail_sign {
            return Err("token removed".into());
        }
        let mut value = b"signed:".to_vec();
        value.extend_from_slice(&data[..data.len().min(8)]);
        Ok(value)
    }

    fn certificate(&self) -> std::result::Result<Vec<u8>, SignerError> {
        Ok(self.certificate.clone())
    }

    fn signer_roles(&self) -> Vec<String> {
        self.roles.clone()
    }

    fn city(&self) -> Option<String> {
        self.city.clone()
    }
}

/// Verifier counting its calls; returns preset items, or one success item
/// per signature when none are preset.
#[derive(Default)]
pub(crate) struct TestVerifier {
    pub calls: AtomicUsize,
    pub items: Vec<LogItem>,
}

impl SignatureVerifier for TestVerifier {
    fn verify(
        &self,
        signature: &Signature,
        _data_files: &[DataFile],
        _strict: bool,
    ) -> Vec<LogItem> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.items.is_empty() {
            return self.items.clone();
        }

        let mut item = log_item!(
            format!("signature:{}", signature.id()),
            "signature verified",
            "verify"
        )
        .validation_status(validation_codes::SIGNATURE_VALIDATED);
        item.kind = LogKind::Success;
        vec![item]
    }
}
