use agent_check::ui::render;
use agent_check::{CheckRun, Severity, Thresholds};

fn thresholds() -> Thresholds {
    Thresholds::parse(Some("80"), Some("90")).unwrap()
}

#[test]
fn test_ok_warning_ok_then_critical() {
    let t = thresholds();
    let mut run = CheckRun::new();

    assert_eq!(run.evaluate("a", "10", "%", &t), Severity::Ok);
    assert_eq!(run.evaluate("b", "85", "%", &t), Severity::Warning);
    assert_eq!(run.evaluate("c", "20", "%", &t), Severity::Ok);

    assert_eq!(run.severity(), Severity::Warning);
    assert_eq!(render(&run).1, 1);

    assert_eq!(run.evaluate("d", "95", "%", &t), Severity::Critical);
    assert_eq!(run.severity(), Severity::Critical);
    assert_eq!(render(&run).1, 2);
}

#[test]
fn test_severity_never_decreases() {
    let t = thresholds();
    let mut run = CheckRun::new();
    let values = ["10", "95", "85", "abc", "10", "85"];

    run.evaluate("first", values[0], "%", &t);
    let mut previous = run.severity();
    for (i, value) in values.iter().enumerate().skip(1) {
        run.evaluate(&format!("m{}", i), value, "%", &t);
        assert!(run.severity() >= previous);
        previous = run.severity();
    }
    assert_eq!(run.severity(), Severity::Critical);
}

#[test]
fn test_no_successful_metric_is_unknown() {
    let t = thresholds();
    let mut run = CheckRun::new();
    run.evaluate("a", "", "%", &t);
    run.evaluate("b", "n/a", "%", &t);

    assert_eq!(run.severity(), Severity::Unknown);
    let (line, code) = render(&run);
    assert_eq!(code, 3);
    assert!(line.starts_with("UNKNOWN: a: "));
    assert!(line.ends_with("| 'a'=%;80;90; 'b'=n/a%;80;90;"));
}

#[test]
fn test_independent_runs_do_not_interfere() {
    let t = thresholds();
    let mut critical_run = CheckRun::new();
    let mut ok_run = CheckRun::new();

    critical_run.evaluate("a", "99", "%", &t);
    ok_run.evaluate("a", "1", "%", &t);

    assert_eq!(critical_run.severity(), Severity::Critical);
    assert_eq!(ok_run.severity(), Severity::Ok);
}

#[test]
fn test_rendered_line() {
    let t = Thresholds::parse(Some("~:30"), Some("@32:64")).unwrap();
    let mut run = CheckRun::new();
    run.set_summary("disk queue (2 instances)");
    run.evaluate("0 C:", "12", "", &t);
    run.evaluate("_Total", "33", "", &t);

    let (line, code) = render(&run);
    assert_eq!(
        line,
        "CRITICAL: disk queue (2 instances) | '0 C:'=12;~:30;@32:64; '_Total'=33;~:30;@32:64;"
    );
    assert_eq!(code, 2);
}
