// Validation of connection settings before any request is made
// Errors here are configuration errors and end the check as UNKNOWN

use crate::error::{CheckError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Maximum hostname length (RFC 1035)
const MAX_HOST_LENGTH: usize = 253;

/// Path of the agent endpoint that serves OS specific counters
const COUNTER_ENDPOINT: &str = "/v1/os_specific";

/// One `<number><unit>` component of a duration such as `1m30s`
static DURATION_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)(ms|s|m|h)").expect("duration pattern is valid")
});

static DURATION_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)?(?:ms|s|m|h))+$").expect("duration pattern is valid")
});

/// Validates the agent hostname
/// Checks for:
/// - Empty hostname
/// - Length limit
/// - Characters that would change the meaning of the request URL
pub fn validate_host(host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(CheckError::config("hostname is not set"));
    }
    if host.len() > MAX_HOST_LENGTH {
        return Err(CheckError::config(format!(
            "hostname is too long ({} characters, max {})",
            host.len(),
            MAX_HOST_LENGTH
        )));
    }

    const FORBIDDEN: [char; 8] = ['/', '?', '#', '@', ' ', '\\', '\n', '\0'];
    if let Some(ch) = host.chars().find(|c| FORBIDDEN.contains(c)) {
        return Err(CheckError::config(format!(
            "hostname contains invalid character {:?}",
            ch
        )));
    }

    Ok(())
}

/// Build the counter endpoint URL for the given agent
pub fn counter_url(host: &str, port: u16) -> Result<Url> {
    validate_host(host)?;
    if port == 0 {
        return Err(CheckError::config("port must be between 1 and 65535"));
    }

    // Bare IPv6 literals need brackets inside a URL
    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };

    Url::parse(&format!("https://{}{}", authority, COUNTER_ENDPOINT))
        .map_err(|e| CheckError::config(format!("invalid agent address '{}': {}", host, e)))
}

/// Parse a timeout such as `10s`, `500ms`, `2m` or `1m30s`
pub fn parse_timeout(text: &str) -> Result<Duration> {
    let text = text.trim();
    if !DURATION_FULL.is_match(text) {
        return Err(CheckError::config(format!(
            "error parsing timeout value '{}' (expected e.g. 10s, 500ms, 1m30s)",
            text
        )));
    }

    let mut total = 0.0_f64;
    for caps in DURATION_PART.captures_iter(text) {
        let amount: f64 = caps[1]
            .parse()
            .map_err(|_| CheckError::config(format!("error parsing timeout value '{}'", text)))?;
        let seconds = match &caps[2] {
            "ms" => amount / 1000.0,
            "s" => amount,
            "m" => amount * 60.0,
            _ => amount * 3600.0,
        };
        total += seconds;
    }

    if total <= 0.0 {
        return Err(CheckError::config("timeout must be greater than zero"));
    }

    Duration::try_from_secs_f64(total)
        .map_err(|e| CheckError::config(format!("timeout '{}' out of range: {}", text, e)))
}

/// Client certificate and key must be given together
pub fn validate_client_identity(certificate: Option<&Path>, key: Option<&Path>) -> Result<()> {
    match (certificate, key) {
        (Some(_), None) => Err(CheckError::config(
            "a client certificate was given without its private key",
        )),
        (None, Some(_)) => Err(CheckError::config(
            "a private key was given without its client certificate",
        )),
        _ => Ok(()),
    }
}
