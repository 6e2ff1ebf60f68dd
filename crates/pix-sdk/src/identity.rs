//! Mutual-TLS client identity.
//!
//! Loads the PEM certificate/key pair named by the credentials and builds
//! the `reqwest` client that presents it on every connection.  Failures are
//! terminal: a bad certificate will not start working without operator
//! intervention, so nothing here retries.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, Identity};

use crate::error::CertError;

/// Load a certificate/key pair into a TLS client identity.
///
/// Both files are PEM; the certificate file may carry the full chain.
pub fn load_identity(cert_path: &Path, key_path: &Path) -> Result<Identity, CertError> {
    let mut pem = read(cert_path)?;
    pem.push(b'\n');
    pem.extend(read(key_path)?);
    Identity::from_pem(&pem).map_err(CertError::Invalid)
}

/// Build an HTTP client that presents `identity` and bounds every request
/// by `timeout`.
///
/// A key that does not match its certificate is reported here, when the
/// TLS configuration is assembled.
pub fn build_client(identity: Identity, timeout: Duration) -> Result<Client, CertError> {
    Client::builder()
        .identity(identity)
        .timeout(timeout)
        .build()
        .map_err(CertError::Invalid)
}

fn read(path: &Path) -> Result<Vec<u8>, CertError> {
    std::fs::read(path).map_err(|source| CertError::Read {
        path: path.to_path_buf(),
        source,
    })
}
