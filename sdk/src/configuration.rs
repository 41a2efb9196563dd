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

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{signature::SignatureProfile, signing::DigestAlgorithm};

const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Deployment flavor a [`Configuration`] is preset for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Mode {
    /// Production trust infrastructure.
    Prod,

    /// Public test trust infrastructure.
    Test,
}

/// Resolved configuration values consumed by the toolkit.
///
/// Loading and validating a configuration file (YAML or otherwise) is a
/// caller concern; this core only reads resolved values. A
/// [`TslCache`](crate::tsl::TslCache) is constructed from one
/// `Configuration` and lives exactly as long as it — two configurations
/// never share cached trust material, so multi-tenant and test setups get
/// independent caches.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Configuration {
    /// URL or file path of the trusted list (TSL).
    pub tsl_location: String,

    /// How long a loaded trusted list stays fresh.
    pub tsl_cache_expiration: Duration,

    /// PEM bundle of certificates accepted as trusted-list signers.
    pub tsl_keystore_location: PathBuf,

    /// Password for the TSL keystore, for keystore formats that need one.
    pub tsl_keystore_password: Option<String>,

    /// Directory holding the on-disk trusted-list cache files.
    pub tsl_cache_dir: PathBuf,

    /// Timeout for establishing network connections.
    pub connection_timeout: Duration,

    /// Timeout for reading from an established connection.
    pub socket_timeout: Duration,

    /// Outbound HTTP proxy, if any.
    pub proxy: Option<ProxySettings>,

    /// TLS client credentials and trust overrides, if any.
    pub tls: Option<TlsClientSettings>,

    /// Profile requested for newly created signatures.
    pub signature_profile: SignatureProfile,

    /// Digest algorithm requested for newly created signatures.
    pub signature_digest_algorithm: DigestAlgorithm,
}

impl Configuration {
    /// Returns the preset configuration for the given [`Mode`].
    pub fn new(mode: Mode) -> Self {
        let (tsl_location, tsl_keystore_location) = match mode {
            Mode::Prod => (
                "https://ec.europa.eu/information_society/policy/esignature/trusted-list/tl-mp.xml"
                    .to_string(),
                PathBuf::from("keystore/keystore.pem"),
            ),
            Mode::Test => (
                "https://open-eid.github.io/test-TL/tl-mp-test-EE.xml".to_string(),
                PathBuf::from("keystore/test-keystore.pem"),
            ),
        };

        Configuration {
            tsl_location,
            tsl_cache_expiration: ONE_DAY,
            tsl_keystore_location,
            tsl_keystore_password: None,
            tsl_cache_dir: std::env::temp_dir().join("sigdoc-tsl-cache"),
            connection_timeout: Duration::from_millis(1000),
            socket_timeout: Duration::from_millis(1000),
            proxy: None,
            tls: None,
            signature_profile: SignatureProfile::Lt,
            signature_digest_algorithm: DigestAlgorithm::Sha256,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Mode::Prod)
    }
}

/// Outbound HTTP proxy settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProxySettings {
    /// Proxy host name.
    pub host: String,

    /// Proxy port.
    pub port: u16,

    /// Proxy user, if the proxy requires authentication.
    pub user: Option<String>,

    /// Proxy password, if the proxy requires authentication.
    pub password: Option<String>,
}

/// TLS client credentials and trust overrides for outbound connections.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TlsClientSettings {
    /// Client keystore path.
    pub keystore_path: Option<PathBuf>,

    /// Client keystore password.
    pub keystore_password: Option<String>,

    /// Truststore path overriding system roots.
    pub truststore_path: Option<PathBuf>,

    /// Truststore password.
    pub truststore_password: Option<String>,
}
