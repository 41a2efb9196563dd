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

//! Mock collaborators shared by the integration tests.

#![allow(dead_code)] // not every test file uses every helper

use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use sigdoc::{
    container_io::{
        ContainerBackend, ContainerFormat, ParsedContainer, PreparedSignature, SignatureRequest,
        SignatureVerifier,
    },
    status_tracker::{log_item, validation_codes, LogItem, LogKind, StatusTracker},
    Configuration, DataFile, DigestAlgorithm, Error, Mode, Result, Signature, SignatureProfile,
    Signer, SignerError,
};

pub const ROOT_PEM: &[u8] = include_bytes!("../fixtures/certs/root.pem");
pub const LEAF_PEM: &[u8] = include_bytes!("../fixtures/certs/leaf.pem");
pub const OTHER_ROOT_PEM: &[u8] = include_bytes!("../fixtures/certs/other_root.pem");

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn der_of(pem: &[u8]) -> Vec<u8> {
    x509_parser::pem::Pem::iter_from_buffer(pem)
        .next()
        .expect("fixture bundle is not empty")
        .expect("fixture bundle parses")
        .contents
}

/// A test configuration whose TSL source, keystore, and cache all live
/// under `dir`.
pub fn file_backed_config(dir: &Path, expiration: Duration) -> Configuration {
    let tsl = dir.join("trusted-list.pem");
    fs::write(&tsl, ROOT_PEM).expect("write trust list");

    let keystore = dir.join("keystore.pem");
    fs::write(&keystore, ROOT_PEM).expect("write keystore");

    let mut config = Configuration::new(Mode::Test);
    config.tsl_location = tsl.to_string_lossy().into_owned();
    config.tsl_cache_expiration = expiration;
    config.tsl_keystore_location = keystore;
    config.tsl_cache_dir = dir.join("tsl-cache");
    config
}

/// In-memory stand-in for a format backend.
pub struct MockBackend {
    pub open_template: Option<ParsedContainer>,
    next_id: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        MockBackend {
            open_template: None,
            next_id: AtomicUsize::new(0),
        }
    }

    pub fn opening(parsed: ParsedContainer) -> Self {
        MockBackend {
            open_template: Some(parsed),
            next_id: AtomicUsize::new(0),
        }
    }
}

impl ContainerBackend for MockBackend {
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
                SignatureProfile::Lt,
            )
            .with_value(bytes.to_vec())),
            None => Err(Error::MalformedSignature("missing SIG: prefix".to_string())),
        }
    }

    fn write(&self, data_files: &[DataFile], signatures: &[Signature], path: &Path) -> Result<()> {
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
}

/// Signer whose certificate is the leaf fixture, chaining to the root
/// fixture.
pub struct LeafSigner;

impl Signer for LeafSigner {
    fn sign(
        &self,
        _digest_algorithm: DigestAlgorithm,
        data: &[u8],
    ) -> std::result::Result<Vec<u8>, SignerError> {
        let mut value = b"signed:".to_vec();
        value.extend_from_slice(&data[..data.len().min(8)]);
        Ok(value)
    }

    fn certificate(&self) -> std::result::Result<Vec<u8>, SignerError> {
        Ok(der_of(LEAF_PEM))
    }

    fn signer_roles(&self) -> Vec<String> {
        vec!["authorized representative".to_string()]
    }

    fn city(&self) -> Option<String> {
        Some("Tallinn".to_string())
    }

    fn country(&self) -> Option<String> {
        Some("EE".to_string())
    }
}

/// Verifier counting its calls; reports one success item per signature.
#[derive(Default)]
pub struct CountingVerifier {
    pub calls: AtomicUsize,
}

impl SignatureVerifier for CountingVerifier {
    fn verify(
        &self,
        signature: &Signature,
        _data_files: &[DataFile],
        _strict: bool,
    ) -> Vec<LogItem> {
        self.calls.fetch_add(1, Ordering::SeqCst);

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

/// An open log holding one fatal parse diagnostic.
pub fn fatal_open_log() -> StatusTracker {
    let mut open_log = StatusTracker::default();
    log_item!("container", "container could not be parsed", "open")
        .validation_status(validation_codes::CONTAINER_MALFORMED)
        .fatal_no_throw(&mut open_log, "truncated archive");
    open_log
}
