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

use serde::Serialize;
use sigdoc_status_tracker::{log_item, validation_codes, LogItem, LogKind, StatusTracker};

use crate::{
    container::Container, container_io::SignatureVerifier, tsl::TslCertificateSource, Result,
};

/// Aggregated verdict of container validation.
///
/// Validation converts lower-level verification failures into data: a
/// badly-signed but parsable container always validates to a result (which
/// may contain failure items) rather than an error.
///
/// The item ordering is a contract: open-time diagnostics come first,
/// followed by each signature's items in signature order, preserving the
/// order the verifier produced within each signature.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationResult {
    items: Vec<LogItem>,
}

impl ValidationResult {
    /// All recorded items, in contract order.
    pub fn items(&self) -> &[LogItem] {
        &self.items
    }

    /// Returns `true` if no item describes an error condition.
    pub fn is_valid(&self) -> bool {
        !self.items.iter().any(|item| item.is_error())
    }

    /// Items describing error conditions, in contract order.
    pub fn errors(&self) -> impl Iterator<Item = &LogItem> {
        self.items.iter().filter(|item| item.is_error())
    }

    /// Items describing warning conditions, in contract order.
    pub fn warnings(&self) -> impl Iterator<Item = &LogItem> {
        self.items
            .iter()
            .filter(|item| item.kind == LogKind::Warning)
    }

    /// Returns `true` if any item carries the given validation status code.
    pub fn has_status(&self, code: &str) -> bool {
        self.items.iter().any(|item| {
            item.validation_status
                .as_deref()
                .map(|status| status == code)
                .unwrap_or(false)
        })
    }

    /// JSON report of the aggregated diagnostics.
    pub fn report(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.items).map_err(crate::Error::from)
    }
}

/// Walk a container's signatures and aggregate every diagnostic into one
/// ordered result.
pub(crate) fn validate_container(
    container: &Container,
    verifier: &dyn SignatureVerifier,
    trust: &TslCertificateSource,
    strict: bool,
) -> ValidationResult {
    let open_log = container.open_log();

    // A container that failed to parse cannot be meaningfully
    // signature-checked; its open diagnostics are the whole verdict.
    if open_log.has_fatal_error() {
        return ValidationResult {
            items: open_log.logged_items().to_vec(),
        };
    }

    let mut tracker = StatusTracker::default();
    tracker.append(open_log);

    for signature in container.signatures() {
        tracker.push_signature_id(signature.id());
        let label = format!("signature:{}", signature.id());

        for item in verifier.verify(signature, container.data_files(), strict) {
            if item.is_error() {
                // Aggregating tracker: the error value is recorded, never
                // thrown.
                let _ = tracker.add_error(item, ());
            } else {
                tracker.add_non_error(item);
            }
        }

        match signature.signing_certificate() {
            None => {
                // Still verified above, but reported distinctly; a missing
                // certificate is a lower-trust state, not a structural
                // failure.
                log_item!(
                    label.clone(),
                    "signature has no embedded signing certificate",
                    "validate_container"
                )
                .validation_status(validation_codes::SIGNATURE_CERTIFICATE_MISSING)
                .warning(&mut tracker);
            }
            Some(_) => {
                let chain = signature.certificate_chain();
                if trust.is_chain_anchored(&chain) {
                    log_item!(
                        label.clone(),
                        "certificate chain terminates at a trust anchor",
                        "validate_container"
                    )
                    .validation_status(validation_codes::SIGNATURE_CHAIN_TRUSTED)
                    .success(&mut tracker);
                } else {
                    log_item!(
                        label.clone(),
                        "certificate chain has no anchor in the current trusted set",
                        "validate_container"
                    )
                    .validation_status(validation_codes::SIGNATURE_CHAIN_UNTRUSTED)
                    .failure_no_throw(&mut tracker, "untrusted certificate chain");
                }
            }
        }

        tracker.pop_signature_id();
    }

    ValidationResult {
        items: tracker.into_items(),
    }
}
