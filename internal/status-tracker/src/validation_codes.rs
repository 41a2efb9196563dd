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

//! Well-known status codes attached to validation log items.
//!
//! Codes are stable dotted-path strings so that callers can classify
//! aggregated results without string-matching free-form descriptions.

use crate::LogKind;

// -- success codes --

/// The container was parsed without any diagnostics.
pub const CONTAINER_OPENED: &str = "container.opened";

/// The signature's structural and cryptographic verification passed.
pub const SIGNATURE_VALIDATED: &str = "signature.validated";

/// The signing certificate chain terminates at a configured trust anchor.
pub const SIGNATURE_CHAIN_TRUSTED: &str = "signingCertificate.chain.trusted";

/// The trusted list was loaded and its integrity signature verified.
pub const TRUST_LIST_LOADED: &str = "trustList.loaded";

// -- warning codes --

/// The signature carries no embedded signing certificate value.
///
/// This is a lower-trust state, not an error by itself: the signature is
/// still verified, but it cannot be resolved to a certificate-bearing view.
pub const SIGNATURE_CERTIFICATE_MISSING: &str = "signingCertificate.missing";

// -- failure codes --

/// A non-fatal diagnostic was recorded while parsing the container.
pub const CONTAINER_OPEN_FAILURE: &str = "container.open.failure";

/// The signature value does not match the signed data.
pub const SIGNATURE_VALUE_MISMATCH: &str = "signature.value.mismatch";

/// A data file digest referenced by the signature does not match the file.
pub const SIGNATURE_DIGEST_MISMATCH: &str = "signature.digest.mismatch";

/// The signing certificate chain has no anchor in the current trusted set.
///
/// Deliberately distinct from structural verification failures so that
/// callers can classify (or downgrade) trust decisions without
/// string-matching generic verifier output.
pub const SIGNATURE_CHAIN_UNTRUSTED: &str = "signingCertificate.chain.untrusted";

/// The trusted list's own integrity signature failed verification.
pub const TRUST_LIST_INTEGRITY_FAILURE: &str = "trustList.integrity.failure";

// -- fatal codes --

/// The container could not be parsed; no signature verification is possible.
pub const CONTAINER_MALFORMED: &str = "container.malformed";

/// Returns the [`LogKind`] conventionally associated with a status code.
///
/// Codes not listed in this module are classified as
/// [`LogKind::Informational`].
pub fn log_kind(code: &str) -> LogKind {
    match code {
        CONTAINER_OPENED | SIGNATURE_VALIDATED | SIGNATURE_CHAIN_TRUSTED | TRUST_LIST_LOADED => {
            LogKind::Success
        }
        SIGNATURE_CERTIFICATE_MISSING => LogKind::Warning,
        CONTAINER_OPEN_FAILURE
        | SIGNATURE_VALUE_MISMATCH
        | SIGNATURE_DIGEST_MISMATCH
        | SIGNATURE_CHAIN_UNTRUSTED
        | TRUST_LIST_INTEGRITY_FAILURE => LogKind::Failure,
        CONTAINER_MALFORMED => LogKind::Fatal,
        _ => LogKind::Informational,
    }
}
