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

use std::borrow::Cow;

use crate::{log_item, validation_codes, LogItem, LogKind, StatusTracker};

#[test]
fn r#macro() {
    let log = log_item!("signature:S0", "value mismatch", "test func");

    assert_eq!(
        log,
        LogItem {
            kind: LogKind::Informational,
            label: Cow::Borrowed("signature:S0"),
            description: Cow::Borrowed("value mismatch"),
            crate_name: env!("CARGO_PKG_NAME").into(),
            crate_version: env!("CARGO_PKG_VERSION").into(),
            file: Cow::Borrowed(file!()),
            function: Cow::Borrowed("test func"),
            line: log.line,
            ..Default::default()
        }
    );

    assert!(log.line > 2);
}

#[test]
fn macro_from_string() {
    let desc = "value mismatch".to_string();
    let log = log_item!("signature:S0", desc, "test func");
    assert_eq!(log.description, "value mismatch");
}

#[test]
fn validation_status() {
    let log = log_item!("signature:S0", "chain has no trust anchor", "test func")
        .validation_status(validation_codes::SIGNATURE_CHAIN_UNTRUSTED);

    assert_eq!(
        log.validation_status.as_deref(),
        Some(validation_codes::SIGNATURE_CHAIN_UNTRUSTED)
    );
}

#[test]
fn success() {
    let mut tracker = StatusTracker::default();
    log_item!("signature:S0", "signature validated", "test func").success(&mut tracker);

    assert_eq!(tracker.logged_items().len(), 1);
    assert_eq!(tracker.logged_items()[0].kind, LogKind::Success);
    assert!(!tracker.has_any_error());
}

#[test]
fn warning_is_not_an_error() {
    let mut tracker = StatusTracker::default();
    log_item!("signature:S0", "no embedded certificate", "test func")
        .validation_status(validation_codes::SIGNATURE_CERTIFICATE_MISSING)
        .warning(&mut tracker);

    assert_eq!(tracker.logged_items().len(), 1);
    assert_eq!(tracker.logged_items()[0].kind, LogKind::Warning);
    assert!(!tracker.has_any_error());
}

#[test]
fn failure_records_err_val() {
    let mut tracker = StatusTracker::default();
    let err = log_item!("signature:S0", "value mismatch", "test func")
        .failure(&mut tracker, "sample error")
        .unwrap();

    assert_eq!(err, "sample error");
    assert_eq!(
        tracker.logged_items()[0].err_val.as_deref(),
        Some("\"sample error\"")
    );
    assert!(tracker.has_any_error());
    assert!(!tracker.has_fatal_error());
}

#[test]
fn fatal_no_throw() {
    let mut tracker = StatusTracker::default();
    log_item!("container", "container could not be parsed", "test func")
        .validation_status(validation_codes::CONTAINER_MALFORMED)
        .fatal_no_throw(&mut tracker, "parse error");

    assert!(tracker.has_fatal_error());
    assert!(tracker.logged_items()[0].is_error());
}

#[test]
fn log_kind_classification() {
    assert_eq!(
        validation_codes::log_kind(validation_codes::SIGNATURE_VALIDATED),
        LogKind::Success
    );
    assert_eq!(
        validation_codes::log_kind(validation_codes::SIGNATURE_CERTIFICATE_MISSING),
        LogKind::Warning
    );
    assert_eq!(
        validation_codes::log_kind(validation_codes::SIGNATURE_CHAIN_UNTRUSTED),
        LogKind::Failure
    );
    assert_eq!(
        validation_codes::log_kind(validation_codes::CONTAINER_MALFORMED),
        LogKind::Fatal
    );
    assert_eq!(
        validation_codes::log_kind("some.unknown.code"),
        LogKind::Informational
    );
}
