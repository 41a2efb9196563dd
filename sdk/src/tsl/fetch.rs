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

use std::{error::Error, fmt, fs, io::Read};

use url::Url;
use x509_parser::{pem::Pem, prelude::*};

use super::TslError;
use crate::configuration::Configuration;

// Trust lists are small documents; anything beyond this is suspect.
const MAX_TRUST_LIST_BYTES: u64 = 10_000_000;

/// Fetches trust-list documents and verifies their integrity signature.
///
/// The fetch side of this contract may fail transiently
/// ([`TslError::SourceUnavailable`]) and callers may retry it; the
/// integrity side must never be retried on failure.
pub trait TrustListFetcher: Send + Sync {
    /// Fetch the raw trust-list document from `location`.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TslError>;

    /// Verify the document's own integrity signature against the accepted
    /// signer certificates (DER) from the configured keystore.
    fn verify_integrity(&self, document: &[u8], keystore: &[Vec<u8>]) -> Result<(), IntegrityError>;
}

/// Error returned when a trust list fails its integrity verification.
#[derive(Debug, Eq, PartialEq)]
pub struct IntegrityError(pub String);

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for IntegrityError {}

/// Fetches PEM-bundle trust lists over http(s) or from local files.
///
/// Network requests honor the configuration's connection and socket
/// timeouts and optional proxy. The integrity check is structural: the
/// bundle's first certificate is taken as the list-signer certificate and
/// must be pinned by the keystore, either directly or as a certificate the
/// keystore issued. Deployments consuming cryptographically signed list
/// formats (ETSI XML) supply their own [`TrustListFetcher`].
pub struct PemTrustListFetcher {
    agent: ureq::Agent,
}

impl PemTrustListFetcher {
    /// Build a fetcher from the configuration's network settings.
    pub fn new(config: &Configuration) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .timeout_connect(config.connection_timeout)
            .timeout_read(config.socket_timeout);

        if let Some(proxy) = &config.proxy {
            let spec = match (&proxy.user, &proxy.password) {
                (Some(user), Some(password)) => {
                    format!("http://{user}:{password}@{}:{}", proxy.host, proxy.port)
                }
                _ => format!("http://{}:{}", proxy.host, proxy.port),
            };
            match ureq::Proxy::new(&spec) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => log::warn!("ignoring unusable proxy configuration: {e}"),
            }
        }

        PemTrustListFetcher {
            agent: builder.build(),
        }
    }

    fn fetch_http(&self, location: &str) -> Result<Vec<u8>, TslError> {
        let unavailable = |source: Box<dyn Error + Send + Sync + 'static>| TslError::SourceUnavailable {
            location: location.to_string(),
            source: Some(source),
        };

        let response = self
            .agent
            .get(location)
            .call()
            .map_err(|e| unavailable(Box::new(e)))?;

        let len = response
            .header("Content-Length")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(65536);

        let mut body = Vec::with_capacity(len);
        response
            .into_reader()
            .take(MAX_TRUST_LIST_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| unavailable(Box::new(e)))?;

        Ok(body)
    }

    fn fetch_file(&self, location: &str, path: &std::path::Path) -> Result<Vec<u8>, TslError> {
        fs::read(path).map_err(|e| TslError::SourceUnavailable {
            location: location.to_string(),
            source: Some(Box::new(e)),
        })
    }
}

impl TrustListFetcher for PemTrustListFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TslError> {
        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                self.fetch_http(location)
            }
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => self.fetch_file(location, &path),
                Err(()) => Err(TslError::SourceUnavailable {
                    location: location.to_string(),
                    source: None,
                }),
            },
            // Not a URL; treat the location as a plain file path.
            _ => self.fetch_file(location, std::path::Path::new(location)),
        }
    }

    fn verify_integrity(&self, document: &[u8], keystore: &[Vec<u8>]) -> Result<(), IntegrityError> {
        let not_etsi =
            || IntegrityError("Not ETSI compliant signature. The signature is not valid.".to_string());

        // The bundle's first certificate is the list-signer certificate.
        let signer = Pem::iter_from_buffer(document)
            .next()
            .and_then(|pem| pem.ok())
            .map(|pem| pem.contents)
            .ok_or_else(not_etsi)?;

        if keystore.iter().any(|accepted| *accepted == signer) {
            return Ok(());
        }

        // Accept a signer certificate issued by a keystore certificate.
        if let Ok((_, signer_cert)) = X509Certificate::from_der(&signer) {
            let issuer_raw = signer_cert.issuer().as_raw();
            let issued_by_keystore = keystore.iter().any(|accepted| {
                X509Certificate::from_der(accepted)
                    .map(|(_, anchor)| anchor.subject().as_raw() == issuer_raw)
                    .unwrap_or(false)
            });
            if issued_by_keystore {
                return Ok(());
            }
        }

        Err(not_etsi())
    }
}
