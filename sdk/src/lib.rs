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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

//! This library supports creating, signing, and validating
//! digital-signature containers (DDOC and ASiC-E).
//!
//! A [`Container`] bundles data files with the signatures over them and
//! enforces the signed-state invariants: once a signature exists, the data
//! file list is locked until every signature is removed again. Signing is
//! delegated to a [`Signer`] capability, format-specific packaging to a
//! [`container_io::ContainerBackend`] strategy, and trust decisions to the
//! trusted-list cache in [`tsl`].
//!
//! # Example: container lifecycle
//!
//! ```
//! use std::sync::Arc;
//!
//! use sigdoc::{Container, ContainerFormat};
//! # use std::path::Path;
//! # use sigdoc::container_io::{ContainerBackend, ParsedContainer, PreparedSignature, SignatureRequest};
//! # use sigdoc::{DataFile, Error, Result, Signature};
//! # struct NullBackend;
//! # impl ContainerBackend for NullBackend {
//! #     fn format(&self) -> ContainerFormat { ContainerFormat::AsicE }
//! #     fn open(&self, _: &Path) -> Result<ParsedContainer> { Err(Error::BadParam("unsupported".into())) }
//! #     fn parse_signature(&self, _: &[u8], _: &[DataFile]) -> Result<Signature> { Err(Error::MalformedSignature("unsupported".into())) }
//! #     fn write(&self, _: &[DataFile], _: &[Signature], _: &Path) -> Result<()> { Ok(()) }
//! #     fn prepare_signature(&self, _: &[DataFile], _: SignatureRequest) -> Result<PreparedSignature> { Err(Error::BadParam("unsupported".into())) }
//! #     fn complete_signature(&self, _: PreparedSignature, _: Vec<u8>) -> Result<Signature> { Err(Error::BadParam("unsupported".into())) }
//! # }
//! # fn main() -> Result<()> {
//! let mut container = Container::create(Arc::new(NullBackend));
//! container.add_data_file_from_bytes(b"hello".to_vec(), "hello.txt", "text/plain")?;
//! assert_eq!(container.data_files().len(), 1);
//! container.remove_data_file("HELLO.TXT")?; // names compare case-insensitively
//! # Ok(())
//! # }
//! ```

mod configuration;
pub use configuration::{Configuration, Mode, ProxySettings, TlsClientSettings};

mod container;
pub use container::Container;

pub mod container_io;
pub use container_io::ContainerFormat;

mod data_file;
pub use data_file::{DataFile, DataFileContent};

mod error;
pub use error::{Error, Result};

mod signature;
pub use signature::{ProductionPlace, ResolvedSignature, Signature, SignatureProfile};

mod signing;
pub use signing::{DigestAlgorithm, Signer, SignerError};

pub mod tsl;

mod validator;
pub use validator::ValidationResult;

/// Diagnostic records and aggregation, re-exported for implementors of
/// [`container_io::ContainerBackend`] and
/// [`container_io::SignatureVerifier`].
pub use sigdoc_status_tracker as status_tracker;

#[cfg(test)]
pub(crate) mod test_utils;

/// The internal name of this library.
pub const NAME: &str = "sigdoc";
/// The version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
