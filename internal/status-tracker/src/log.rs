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

use std::{borrow::Cow, fmt::Debug};

use serde::{Deserialize, Serialize};

use crate::status_tracker::StatusTracker;

/// Creates a [`LogItem`] struct that is annotated with the source file and
/// line number where the log condition was discovered.
///
/// Takes three parameters, each of which may be a `&'static str` or `String`:
///
/// * `label`: name of the entity this `LogItem` references (typically a data
///   file name or signature id)
/// * `description`: human-readable reason for this `LogItem` to have been
///   generated
/// * `function`: name of the function generating this `LogItem`
///
/// ## Example
///
/// ```
/// # use sigdoc_status_tracker::{log_item, LogItem, LogKind};
/// let log = log_item!("signature:S0", "signature value mismatch", "verify_signature");
/// assert_eq!(log.kind, LogKind::Informational);
/// assert_eq!(log.label, "signature:S0");
/// ```
#[macro_export]
macro_rules! log_item {
    ($label:expr, $description:expr, $function:expr) => {{
        $crate::LogItem {
            kind: $crate::LogKind::Informational,
            label: $label.into(),
            crate_name: env!("CARGO_PKG_NAME").into(),
            crate_version: env!("CARGO_PKG_VERSION").into(),
            file: file!().into(),
            function: $function.into(),
            line: line!(),
            description: $description.into(),
            ..Default::default()
        }
    }};
}

/// Detailed information about an error or other noteworthy condition.
///
/// Use the [`log_item`](crate::log_item) macro to create a `LogItem`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LogItem {
    /// Kind of log item.
    pub kind: LogKind,

    /// Name of the container entity the item references (data file name,
    /// signature id), or other descriptive label.
    pub label: Cow<'static, str>,

    /// Description of the condition.
    pub description: Cow<'static, str>,

    /// Crate where the condition was detected.
    pub crate_name: Cow<'static, str>,

    /// Version of that crate.
    pub crate_version: Cow<'static, str>,

    /// Source file where the condition was detected.
    pub file: Cow<'static, str>,

    /// Function where the condition was detected.
    pub function: Cow<'static, str>,

    /// Source line number where the condition was detected.
    pub line: u32,

    /// Error value as a string, if the condition was raised by an error.
    pub err_val: Option<Cow<'static, str>>,

    /// Validation status code (see [`crate::validation_codes`]).
    pub validation_status: Option<Cow<'static, str>>,

    /// Id of the signature being validated when the item was recorded, if any.
    pub signature_id: Option<Cow<'static, str>>,
}

impl Default for LogItem {
    fn default() -> Self {
        LogItem {
            kind: LogKind::Informational,
            label: Cow::Borrowed(""),
            description: Cow::Borrowed(""),
            crate_name: env!("CARGO_PKG_NAME").into(),
            crate_version: env!("CARGO_PKG_VERSION").into(),
            file: Cow::Borrowed(""),
            function: Cow::Borrowed(""),
            line: 0,
            err_val: None,
            validation_status: None,
            signature_id: None,
        }
    }
}

impl LogItem {
    /// Add a validation status code.
    ///
    /// ## Example
    ///
    /// ```
    /// # use sigdoc_status_tracker::{log_item, validation_codes};
    /// let log = log_item!("signature:S0", "chain has no trust anchor", "validate")
    ///     .validation_status(validation_codes::SIGNATURE_CHAIN_UNTRUSTED);
    /// ```
    #[must_use]
    pub fn validation_status(self, status: &'static str) -> Self {
        LogItem {
            validation_status: Some(status.into()),
            ..self
        }
    }

    /// Add the id of the signature being validated.
    pub fn set_signature_id<S: Into<String>>(self, id: S) -> Self {
        LogItem {
            signature_id: Some(id.into().into()),
            ..self
        }
    }

    /// Set the log item kind to [`LogKind::Success`] and add it to the
    /// [`StatusTracker`].
    pub fn success(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Success;
        tracker.add_non_error(self);
    }

    /// Set the log item kind to [`LogKind::Informational`] and add it to the
    /// [`StatusTracker`].
    pub fn informational(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Informational;
        tracker.add_non_error(self);
    }

    /// Set the log item kind to [`LogKind::Warning`] and add it to the
    /// [`StatusTracker`].
    ///
    /// Warnings never interrupt processing, regardless of the tracker's
    /// error behavior.
    pub fn warning(mut self, tracker: &mut StatusTracker) {
        self.kind = LogKind::Warning;
        tracker.add_non_error(self);
    }

    /// Set the log item kind to [`LogKind::Failure`] and add it to the
    /// [`StatusTracker`].
    ///
    /// Some implementations are configured to stop immediately on errors. If
    /// so, this function will return `Err(err)`.
    ///
    /// If the implementation is configured to aggregate all log messages,
    /// this function will return `Ok(err)`.
    pub fn failure<E: Debug>(mut self, tracker: &mut StatusTracker, err: E) -> Result<E, E> {
        self.kind = LogKind::Failure;
        self.err_val = Some(format!("{err:?}").into());
        tracker.add_error(self, err)
    }

    /// Set the log item kind to [`LogKind::Failure`] and add it to the
    /// [`StatusTracker`].
    ///
    /// Does not return a [`Result`] and thus ignores the [`StatusTracker`]
    /// error-handling configuration.
    pub fn failure_no_throw<E: Debug>(mut self, tracker: &mut StatusTracker, err: E) {
        self.kind = LogKind::Failure;
        self.err_val = Some(format!("{err:?}").into());
        tracker.add_non_error(self);
    }

    /// Set the log item kind to [`LogKind::Fatal`] and add it to the
    /// [`StatusTracker`].
    ///
    /// Fatal items mark conditions after which no further processing of the
    /// affected entity is meaningful (for example, a container that could
    /// not be parsed). They are recorded, never thrown.
    pub fn fatal_no_throw<E: Debug>(mut self, tracker: &mut StatusTracker, err: E) {
        self.kind = LogKind::Fatal;
        self.err_val = Some(format!("{err:?}").into());
        tracker.add_non_error(self);
    }

    /// Returns `true` if this item describes an error condition
    /// ([`LogKind::Failure`] or [`LogKind::Fatal`]).
    pub fn is_error(&self) -> bool {
        matches!(self.kind, LogKind::Failure | LogKind::Fatal)
    }
}

/// Descriptive nature of a [`LogItem`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum LogKind {
    /// This [`LogItem`] describes a success condition.
    Success,

    /// This [`LogItem`] describes an informational condition.
    Informational,

    /// This [`LogItem`] describes a condition that lowers confidence in the
    /// entity without making it invalid.
    Warning,

    /// This [`LogItem`] describes a failure or error condition.
    Failure,

    /// This [`LogItem`] describes a condition after which no further
    /// processing of the affected entity is meaningful.
    Fatal,
}
