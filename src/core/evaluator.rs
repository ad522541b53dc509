//! Check run state and per-metric evaluation.
//!
//! A [`CheckRun`] is created once per invocation, fed one metric at a time,
//! and finally handed to the formatter. It is a plain value: callers own it
//! and pass it around by reference.

use super::severity::Severity;
use super::threshold::{parse_measurement, Thresholds};

/// One `'label'=value[unit];warn;crit;` fragment of the output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceData {
    pub label: String,
    /// Raw measurement text, echoed verbatim
    pub value: String,
    pub unit: String,
    pub warn: String,
    pub crit: String,
}

#[derive(Debug, Default)]
pub struct CheckRun {
    worst: Option<Severity>,
    entries: Vec<PerformanceData>,
    summary: String,
    diagnostics: Vec<String>,
}

impl CheckRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one measurement against the configured thresholds and fold
    /// the verdict into the run. Returns the metric's own severity.
    pub fn evaluate(
        &mut self,
        label: &str,
        raw_value: &str,
        unit: &str,
        thresholds: &Thresholds,
    ) -> Severity {
        self.entries.push(PerformanceData {
            label: label.to_string(),
            value: raw_value.to_string(),
            unit: unit.to_string(),
            warn: thresholds.warning_text().to_string(),
            crit: thresholds.critical_text().to_string(),
        });

        let severity = match parse_measurement(raw_value) {
            Ok(value) => classify(value, thresholds),
            Err(e) => {
                log::warn!("{}: {}", label, e);
                self.diagnostics.push(format!("{}: {}", label, e));
                Severity::Unknown
            }
        };

        log::debug!("{} = {} -> {}", label, raw_value, severity);
        self.record(severity);
        severity
    }

    /// Fold a verdict into the run. The first verdict sets the baseline and
    /// later ones can only raise it.
    fn record(&mut self, severity: Severity) {
        self.worst = Some(match self.worst {
            Some(current) => current.worst(severity),
            None => severity,
        });
    }

    /// Abandon the run: the result becomes UNKNOWN with `message` as the
    /// only explanation and no performance data.
    pub fn abort<S: Into<String>>(&mut self, message: S) {
        self.worst = Some(Severity::Unknown);
        self.entries.clear();
        self.diagnostics = vec![message.into()];
    }

    pub fn set_summary<S: Into<String>>(&mut self, summary: S) {
        self.summary = summary.into();
    }

    /// Overall state; UNKNOWN until some metric has been evaluated
    pub fn severity(&self) -> Severity {
        self.worst.unwrap_or(Severity::Unknown)
    }

    pub fn entries(&self) -> &[PerformanceData] {
        &self.entries
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }
}

fn classify(value: f64, thresholds: &Thresholds) -> Severity {
    if thresholds.critical().is_some_and(|range| range.check(value)) {
        Severity::Critical
    } else if thresholds.warning().is_some_and(|range| range.check(value)) {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
