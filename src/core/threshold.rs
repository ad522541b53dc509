//! Threshold range parsing and evaluation.
//!
//! Implements the monitoring-plugins range syntax:
//!
//! ```text
//! [@]N        alert outside [0, N]
//! [@]N:       alert outside [N, +inf)
//! [@]~:N      alert outside (-inf, N]
//! [@]N:M      alert outside [N, M]
//! ```
//!
//! A leading `@` flips the policy so the alert fires *inside* the range.
//! Both bounds are inclusive.

use crate::error::{CheckError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Plain decimal numbers only: no exponent, no `inf`/`nan`, no whitespace
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("number pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub start: f64,
    pub end: f64,
    pub start_infinity: bool,
    pub end_infinity: bool,
    pub inverted: bool,
}

impl RangeSpec {
    /// Parse a threshold specification such as `10`, `10:`, `~:30`, `5:33` or `@32:64`
    pub fn parse(spec: &str) -> Result<Self> {
        let (inverted, body) = match spec.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, spec),
        };

        if body.is_empty() {
            return Err(CheckError::invalid_range(spec, "empty range"));
        }

        let Some((start_text, end_text)) = body.split_once(':') else {
            // A bare value means [0, N]
            let end = parse_bound(spec, body)?;
            return Ok(RangeSpec {
                start: 0.0,
                end,
                start_infinity: false,
                end_infinity: false,
                inverted,
            });
        };

        let (start, start_infinity) = match start_text {
            "~" => (0.0, true),
            "" => return Err(CheckError::invalid_range(spec, "missing start value")),
            text => (parse_bound(spec, text)?, false),
        };

        let (end, end_infinity) = match end_text {
            "" => (0.0, true),
            "~" => {
                return Err(CheckError::invalid_range(
                    spec,
                    "'~' is only valid as a start bound, leave the end empty for +infinity",
                ))
            }
            text => (parse_bound(spec, text)?, false),
        };

        if start_infinity && end_infinity {
            return Err(CheckError::invalid_range(
                spec,
                "range cannot be unbounded on both sides",
            ));
        }

        Ok(RangeSpec {
            start,
            end,
            start_infinity,
            end_infinity,
            inverted,
        })
    }

    /// Returns true when `value` breaches the threshold
    pub fn check(&self, value: f64) -> bool {
        let within = (self.start_infinity || value >= self.start)
            && (self.end_infinity || value <= self.end);

        if self.inverted {
            within
        } else {
            !within
        }
    }

    /// Like [`RangeSpec::check`] but for a raw textual measurement
    pub fn check_str(&self, raw: &str) -> Result<bool> {
        Ok(self.check(parse_measurement(raw)?))
    }

    /// Reject ranges whose finite start lies above their finite end.
    ///
    /// Such ranges parse, but would either never or always alert, so they
    /// are treated as a configuration mistake rather than swapped.
    pub fn validate(&self) -> Result<()> {
        if !self.start_infinity && !self.end_infinity && self.start > self.end {
            return Err(CheckError::config(format!(
                "threshold range start {} is greater than end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

impl FromStr for RangeSpec {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        RangeSpec::parse(s)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            f.write_str("@")?;
        }
        if self.start_infinity {
            f.write_str("~:")?;
        } else if self.start != 0.0 || self.end_infinity {
            write!(f, "{}:", self.start)?;
        }
        if !self.end_infinity {
            write!(f, "{}", self.end)?;
        }
        Ok(())
    }
}

fn parse_bound(spec: &str, text: &str) -> Result<f64> {
    if !NUMBER.is_match(text) {
        return Err(CheckError::invalid_range(
            spec,
            format!("'{}' is not a number", text),
        ));
    }
    let value = text
        .parse::<f64>()
        .map_err(|e| CheckError::invalid_range(spec, format!("'{}': {}", text, e)))?;
    if !value.is_finite() {
        return Err(CheckError::invalid_range(
            spec,
            format!("'{}' is out of range", text),
        ));
    }
    Ok(value)
}

/// Parse a measurement value as reported by the agent.
///
/// Surrounding whitespace is tolerated here (agents pad values), but
/// anything that is not a finite number is an [`CheckError::InvalidMeasurement`].
pub fn parse_measurement(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CheckError::invalid_measurement(raw)),
    }
}

/// The warning/critical pair configured for a check, kept together with
/// the original text so it can be echoed into performance data.
#[derive(Debug, Clone, Default)]
pub struct Thresholds {
    warning: Option<(String, RangeSpec)>,
    critical: Option<(String, RangeSpec)>,
}

impl Thresholds {
    /// Parse and validate both thresholds. Unset or empty strings never alert.
    pub fn parse(warning: Option<&str>, critical: Option<&str>) -> Result<Self> {
        Ok(Self {
            warning: parse_configured(warning)?,
            critical: parse_configured(critical)?,
        })
    }

    pub fn warning(&self) -> Option<&RangeSpec> {
        self.warning.as_ref().map(|(_, range)| range)
    }

    pub fn critical(&self) -> Option<&RangeSpec> {
        self.critical.as_ref().map(|(_, range)| range)
    }

    /// Original warning text, empty when unset
    pub fn warning_text(&self) -> &str {
        self.warning.as_ref().map_or("", |(text, _)| text.as_str())
    }

    /// Original critical text, empty when unset
    pub fn critical_text(&self) -> &str {
        self.critical.as_ref().map_or("", |(text, _)| text.as_str())
    }
}

fn parse_configured(spec: Option<&str>) -> Result<Option<(String, RangeSpec)>> {
    match spec.filter(|s| !s.is_empty()) {
        Some(text) => {
            let range = RangeSpec::parse(text)?;
            range.validate()?;
            Ok(Some((text.to_string(), range)))
        }
        None => Ok(None),
    }
}
