//! Monitoring agent counter client.
//!
//! The agent exposes `POST /v1/os_specific` which takes a counter path and
//! answers with one value per counter instance. [`CounterSource`] is the seam
//! between the check and the network; [`AgentClient`] is the HTTPS
//! implementation.

use crate::error::{CheckError, Result};
use reqwest::blocking::Client;
use reqwest::{Certificate, Identity, StatusCode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Request body understood by the agent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CounterRequest {
    pub counter_path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CounterResult {
    #[serde(default)]
    pub results: Vec<CounterResultItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CounterResultItem {
    #[serde(default)]
    pub counter_name: String,
    #[serde(default)]
    pub instance_name: String,
    /// Kept as text so it can be echoed verbatim into performance data
    pub value: String,
}

impl CounterResultItem {
    /// Perfdata label: the instance name, or the counter name for
    /// single-instance counters
    pub fn label(&self) -> &str {
        if self.instance_name.is_empty() {
            &self.counter_name
        } else {
            &self.instance_name
        }
    }
}

/// Anything that can produce counter values within a time budget
pub trait CounterSource {
    /// Fetch the counter, giving up once `timeout` has elapsed.
    ///
    /// Implementations must return [`CheckError::Timeout`] when the budget
    /// runs out and [`CheckError::CollectionFailure`] for everything else.
    fn fetch(&self, request: &CounterRequest, timeout: Duration) -> Result<Vec<CounterResultItem>>;
}

/// TLS material for the agent connection
#[derive(Debug, Clone, Default)]
pub struct TlsSettings {
    pub ca_certificate: Option<PathBuf>,
    pub client_certificate: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub insecure: bool,
}

#[derive(Debug, Clone)]
pub struct AgentClient {
    url: Url,
    username: String,
    password: String,
    tls: TlsSettings,
}

impl AgentClient {
    pub fn new(url: Url, username: String, password: String, tls: TlsSettings) -> Self {
        Self {
            url,
            username,
            password,
            tls,
        }
    }

    fn build_client(&self, timeout: Duration) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("agent-check/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(self.tls.insecure);

        if let (Some(cert_path), Some(key_path)) =
            (&self.tls.client_certificate, &self.tls.client_key)
        {
            builder = builder.identity(load_identity(cert_path, key_path)?);
        }

        if let Some(ca_path) = &self.tls.ca_certificate {
            let pem = read_pem(ca_path, "ca certificate")?;
            let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| {
                CheckError::collection(format!("error loading ca certificate {}", error_chain(&e)))
            })?;
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        builder.build().map_err(|e| {
            CheckError::collection(format!("error building https client {}", error_chain(&e)))
        })
    }
}

impl CounterSource for AgentClient {
    fn fetch(&self, request: &CounterRequest, timeout: Duration) -> Result<Vec<CounterResultItem>> {
        let client = self.build_client(timeout)?;

        log::info!("Requesting counter {:?} from {}", request.counter_path, self.url);

        let response = client
            .post(self.url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(request)
            .send()
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        log::debug!("Agent answered with status {}", status);

        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            let detail = body.lines().next().unwrap_or_default().trim().to_string();
            let message = if detail.is_empty() {
                format!("Response code: {}", status.as_u16())
            } else {
                format!("Response code: {} {}", status.as_u16(), detail)
            };
            return Err(CheckError::collection(message));
        }

        let body = response.text().map_err(|e| transport_error(e, timeout))?;
        decode_results(&body)
    }
}

/// Decode the agent's JSON answer, rejecting unknown fields
pub fn decode_results(body: &str) -> Result<Vec<CounterResultItem>> {
    let decoded: CounterResult = serde_json::from_str(body)
        .map_err(|e| CheckError::collection(format!("error decoding agent response {}", e)))?;
    Ok(decoded.results)
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> CheckError {
    if e.is_timeout() {
        CheckError::timeout(timeout)
    } else {
        CheckError::collection(format!("got httpClient error {}", e))
    }
}

/// Load a client certificate and its private key.
///
/// The key may be PKCS#1 (`RSA PRIVATE KEY`), SEC1 (`EC PRIVATE KEY`) or
/// PKCS#8 (`PRIVATE KEY`).
fn load_identity(cert_path: &Path, key_path: &Path) -> Result<Identity> {
    let mut pem = read_pem(cert_path, "client certificate")?;
    let key = read_pem(key_path, "client key")?;
    if !pem.ends_with(b"\n") {
        pem.push(b'\n');
    }
    pem.extend_from_slice(&key);

    Identity::from_pem(&pem).map_err(|e| {
        CheckError::collection(format!(
            "error loading certificate pair {} / {}: {}",
            cert_path.display(),
            key_path.display(),
            error_chain(&e)
        ))
    })
}

/// reqwest builder errors only say "builder error" at the top level
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        CheckError::collection(format!("error loading {} {}: {}", what, path.display(), e))
    })
}
