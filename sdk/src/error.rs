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

use thiserror::Error;

/// `Error` enumerates errors returned by most sigdoc toolkit operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // --- container errors ---
    /// The container holds at least one signature, so its data file list is
    /// locked. Remove all signatures before changing data files.
    #[error("container is signed; remove all signatures before changing data files")]
    ContainerSigned,

    /// No data file with the given name exists in the container. Name
    /// lookup is case-insensitive.
    #[error("data file not found: {0}")]
    DataFileNotFound(String),

    /// A data file with the given name (case-insensitive) already exists in
    /// the container.
    #[error("data file already exists: {0}")]
    DuplicateDataFile(String),

    /// A signature index was outside the container's signature list.
    #[error("signature index {index} out of range: container has {count} signature(s)")]
    SignatureIndexOutOfRange { index: usize, count: usize },

    /// A container with no data files cannot be signed.
    #[error("cannot sign a container with no data files")]
    EmptyContainer,

    /// The external signer failed to produce a signature value, or the
    /// post-sign confirmation step failed.
    #[error("signing failed")]
    SigningFailed(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// A raw signature could not be parsed in the container's format.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The container file itself could not be parsed at all.
    #[error("container could not be parsed: {0}")]
    MalformedContainer(String),

    /// The container could not be written by the format backend.
    #[error("could not persist container")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The signature carries no embedded certificate value and cannot be
    /// resolved to a certificate-bearing view.
    #[error("signature {0} has no embedded signing certificate")]
    NotResolvable(String),

    #[error("bad parameter: {0}")]
    BadParam(String),

    // --- trust-list errors ---
    #[error(transparent)]
    Tsl(#[from] crate::tsl::TslError),

    // --- third-party errors ---
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    OtherError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// A specialized `Result` type for sigdoc toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;
