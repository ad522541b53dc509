use crate::core::evaluator::{CheckRun, PerformanceData};

/// Render the plugin output line and the exit code for a finished run.
///
/// Format: `LABEL: summary | 'label'=value[unit];warn;crit; ...`. The
/// perfdata block is dropped entirely when the run recorded no entries.
pub fn render(run: &CheckRun) -> (String, i32) {
    let severity = run.severity();
    let mut line = severity.label().to_string();

    let text = summary_text(run);
    if !text.is_empty() {
        line.push_str(": ");
        line.push_str(&text);
    }

    if !run.entries().is_empty() {
        let perfdata: Vec<String> = run.entries().iter().map(format_perfdata).collect();
        line.push_str(" | ");
        line.push_str(&perfdata.join(" "));
    }

    (line, severity.exit_code())
}

/// Format one performance data entry as `'label'=value[unit];warn;crit;`
pub fn format_perfdata(entry: &PerformanceData) -> String {
    format!(
        "'{}'={}{};{};{};",
        entry.label.replace('\'', "''"),
        entry.value,
        entry.unit,
        entry.warn,
        entry.crit
    )
}

fn summary_text(run: &CheckRun) -> String {
    let parts: Vec<String> = std::iter::once(run.summary())
        .chain(run.diagnostics().iter().map(String::as_str))
        .map(single_line)
        .filter(|part| !part.is_empty())
        .collect();

    parts.join("; ")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
