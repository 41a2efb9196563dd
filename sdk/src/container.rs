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

use std::{io::Read, path::Path, sync::Arc};

use sigdoc_status_tracker::{LogItem, StatusTracker};

use crate::{
    configuration::Configuration,
    container_io::{ContainerBackend, ContainerFormat, SignatureVerifier},
    data_file::DataFile,
    signature::Signature,
    signing::{self, Signer},
    tsl::{TslCache, TslCertificateSource},
    validator::{self, ValidationResult},
    Error, Result,
};

/// A bundle of data files and the signatures over them, persisted as one
/// file.
///
/// A container can hold several data files, all of which are covered by
/// each signature. Data files can be added to and removed from a container
/// only while it is unsigned; to modify the file list of a signed
/// container, first remove all of its signatures.
///
/// The container owns its data files and signatures exclusively. It is not
/// designed for concurrent mutation: access is single-writer per container
/// instance. Validation and signing of *different* containers may run
/// concurrently, sharing one [`TslCache`].
pub struct Container {
    format: ContainerFormat,
    backend: Arc<dyn ContainerBackend>,
    data_files: Vec<DataFile>,
    signatures: Vec<Signature>,
    open_log: StatusTracker,
}

impl Container {
    /// Create a new, empty container for the backend's format.
    pub fn create(backend: Arc<dyn ContainerBackend>) -> Self {
        Container {
            format: backend.format(),
            backend,
            data_files: Vec::new(),
            signatures: Vec::new(),
            open_log: StatusTracker::default(),
        }
    }

    /// Open an existing container file.
    ///
    /// The backend yields data files, signatures, and open-time diagnostics
    /// in one shot. Recoverable parse problems land in
    /// [`open_diagnostics()`](Self::open_diagnostics) rather than failing
    /// the open; fatal ones short-circuit any later
    /// [`validate()`](Self::validate).
    pub fn open(path: impl AsRef<Path>, backend: Arc<dyn ContainerBackend>) -> Result<Self> {
        let parsed = backend.open(path.as_ref())?;
        Ok(Container {
            format: backend.format(),
            backend,
            data_files: parsed.data_files,
            signatures: parsed.signatures,
            open_log: parsed.open_log,
        })
    }

    /// The container's format tag.
    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    /// Read-only view of the data files, in container order.
    pub fn data_files(&self) -> &[DataFile] {
        &self.data_files
    }

    /// Read-only view of the signatures, in container order.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Diagnostics recorded while opening an existing container. Empty for
    /// a freshly created one.
    pub fn open_diagnostics(&self) -> &[LogItem] {
        self.open_log.logged_items()
    }

    pub(crate) fn open_log(&self) -> &StatusTracker {
        &self.open_log
    }

    /// Add a data file read from disk; the container-internal name is the
    /// path's file name.
    ///
    /// Fails with [`Error::ContainerSigned`] while any signature exists and
    /// with [`Error::DuplicateDataFile`] if the name (case-insensitive) is
    /// already taken.
    pub fn add_data_file(&mut self, path: impl AsRef<Path>, mime_type: &str) -> Result<()> {
        self.push_data_file(DataFile::from_file(path, mime_type)?)
    }

    /// Add a data file from in-memory bytes.
    pub fn add_data_file_from_bytes(
        &mut self,
        data: Vec<u8>,
        name: &str,
        mime_type: &str,
    ) -> Result<()> {
        self.push_data_file(DataFile::from_bytes(data, name, mime_type))
    }

    /// Add a data file by reading a stream to its end.
    pub fn add_data_file_from_reader(
        &mut self,
        reader: impl Read,
        name: &str,
        mime_type: &str,
    ) -> Result<()> {
        self.push_data_file(DataFile::from_reader(reader, name, mime_type)?)
    }

    fn push_data_file(&mut self, data_file: DataFile) -> Result<()> {
        self.ensure_unsigned()?;

        if self
            .data_files
            .iter()
            .any(|existing| existing.matches_name(data_file.name()))
        {
            return Err(Error::DuplicateDataFile(data_file.name().to_string()));
        }

        self.data_files.push(data_file);
        Ok(())
    }

    /// Remove the data file whose name matches `name`, case-insensitively.
    ///
    /// Fails with [`Error::ContainerSigned`] while any signature exists and
    /// with [`Error::DataFileNotFound`] when nothing matches.
    pub fn remove_data_file(&mut self, name: &str) -> Result<DataFile> {
        self.ensure_unsigned()?;

        let index = self
            .data_files
            .iter()
            .position(|existing| existing.matches_name(name))
            .ok_or_else(|| Error::DataFileNotFound(name.to_string()))?;

        Ok(self.data_files.remove(index))
    }

    /// Remove the signature at `index`. Later signatures shift down by one;
    /// their relative order is unchanged.
    pub fn remove_signature(&mut self, index: usize) -> Result<Signature> {
        if index >= self.signatures.len() {
            return Err(Error::SignatureIndexOutOfRange {
                index,
                count: self.signatures.len(),
            });
        }
        Ok(self.signatures.remove(index))
    }

    /// Parse a pre-built signature and append it to the container.
    ///
    /// Fails with [`Error::MalformedSignature`] when the bytes cannot be
    /// parsed in the container's format; the container is unchanged then.
    pub fn add_raw_signature(&mut self, bytes: &[u8]) -> Result<&Signature> {
        let signature = self.backend.parse_signature(bytes, &self.data_files)?;
        self.signatures.push(signature);

        // Just pushed; the list cannot be empty.
        self.signatures
            .last()
            .ok_or_else(|| Error::BadParam("signature list unexpectedly empty".to_string()))
    }

    /// Parse a pre-built signature from a stream and append it.
    pub fn add_raw_signature_from(&mut self, mut reader: impl Read) -> Result<&Signature> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.add_raw_signature(&bytes)
    }

    /// Sign the container's data files and append the new signature.
    ///
    /// The signature profile and digest algorithm come from `config`. The
    /// container gains exactly one signature on success and none on any
    /// failure; a half-built signature is never retained.
    pub fn sign(&mut self, signer: &dyn Signer, config: &Configuration) -> Result<Signature> {
        let signature =
            signing::create_signature(self.backend.as_ref(), &self.data_files, signer, config)?;
        self.signatures.push(signature.clone());
        Ok(signature)
    }

    /// Serialize the container to `path` in its format.
    ///
    /// Failures are reported as [`Error::Persistence`] wrapping the
    /// backend's cause.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.backend
            .write(&self.data_files, &self.signatures, path.as_ref())
            .map_err(|e| match e {
                Error::Persistence(_) => e,
                other => Error::Persistence(Box::new(other)),
            })
    }

    /// Validate the container against the trusted set served by `tsl`.
    ///
    /// Loading the trusted set may fail (a trust-infrastructure problem,
    /// surfaced as [`Error::Tsl`]); validation itself always yields a
    /// [`ValidationResult`], even for a badly-signed container.
    pub fn validate(
        &self,
        verifier: &dyn SignatureVerifier,
        tsl: &TslCache,
    ) -> Result<ValidationResult> {
        let trust = tsl.get()?;
        Ok(validator::validate_container(self, verifier, &trust, true))
    }

    /// Validate against an explicit trusted set, selecting the verifier's
    /// checking level with `strict`.
    pub fn validate_with_source(
        &self,
        verifier: &dyn SignatureVerifier,
        trust: &TslCertificateSource,
        strict: bool,
    ) -> ValidationResult {
        validator::validate_container(self, verifier, trust, strict)
    }

    fn ensure_unsigned(&self) -> Result<()> {
        if self.signatures.is_empty() {
            Ok(())
        } else {
            Err(Error::ContainerSigned)
        }
    }
}
