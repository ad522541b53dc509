// Threshold range syntax as operators write it in monitoring configuration
// Reference: https://www.monitoring-plugins.org/doc/guidelines.html#THRESHOLDFORMAT

use agent_check::{CheckError, RangeSpec};

const PROBES: [f64; 13] = [
    -1000.0, -100.0, -32.0, -1.0, 0.0, 4.0, 5.0, 10.0, 31.0, 32.0, 33.0, 64.0, 1000.0,
];

#[test]
fn test_zero_to_n_or_alert() {
    let r = RangeSpec::parse("10").unwrap();
    assert_eq!(r.start, 0.0);
    assert_eq!(r.end, 10.0);
    assert!(!r.inverted);
    assert!(r.check(54.0));
    assert!(r.check(-1.0));
    assert!(!r.check(10.0));
    assert!(!r.check(0.0));
}

#[test]
fn test_n_to_infinity_or_alert() {
    let r = RangeSpec::parse("10:").unwrap();
    assert_eq!(r.start, 10.0);
    assert!(r.end_infinity);
    assert!(!r.check(10.0));
    assert!(r.check(9.0));
    assert!(!r.check(11.0));
    assert!(r.check(-1.0));
}

#[test]
fn test_negative_infinity_to_n() {
    let r = RangeSpec::parse("~:30").unwrap();
    assert!(r.start_infinity);
    assert_eq!(r.end, 30.0);
    assert!(!r.check(30.0));
    assert!(r.check(31.0));
    assert!(!r.check(-100.0));
}

#[test]
fn test_outside_defined_range() {
    let r = RangeSpec::parse("5:33").unwrap();
    assert!(!r.check(5.0));
    assert!(!r.check(33.0));
    assert!(r.check(4.0));
    assert!(r.check(34.0));
}

#[test]
fn test_within_wide_range() {
    let r = RangeSpec::parse("10:200").unwrap();
    assert!(!r.check(54.0));
    assert!(!r.check(10.0));
    assert!(r.check(9.0));
    assert!(!r.check(200.0));
    assert!(r.check(201.0));
}

#[test]
fn test_inside_range_alerts_when_inverted() {
    let r = RangeSpec::parse("@32:64").unwrap();
    assert!(r.check(32.0));
    assert!(r.check(64.0));
    assert!(!r.check(31.0));
    assert!(!r.check(65.0));
}

#[test]
fn test_alert_on_single_value() {
    let r = RangeSpec::parse("@32:32").unwrap();
    assert!(r.check(32.0));
    assert!(!r.check(31.0));
    assert!(!r.check(33.0));
}

#[test]
fn test_alert_in_zero_to_n() {
    // "@N" keeps the implicit start of 0, so negative values never alert
    let r = RangeSpec::parse("@32").unwrap();
    assert!(r.check(32.0));
    assert!(r.check(0.0));
    assert!(!r.check(33.0));
    assert!(!r.check(-32.0));
}

#[test]
fn test_positive_infinity_cannot_use_tilde() {
    match RangeSpec::parse("50:~") {
        Err(CheckError::InvalidRangeFormat { spec, .. }) => assert_eq!(spec, "50:~"),
        other => panic!("expected InvalidRangeFormat, got {:?}", other),
    }
}

#[test]
fn test_non_inverted_alerts_exactly_outside_closed_interval() {
    for spec in ["10", "5:33", "-32:32", "32:32"] {
        let r = RangeSpec::parse(spec).unwrap();
        for value in PROBES {
            let inside = value >= r.start && value <= r.end;
            assert_eq!(r.check(value), !inside, "{} at {}", spec, value);
        }
    }
}

#[test]
fn test_half_open_ranges() {
    let upper = RangeSpec::parse("10:").unwrap();
    let lower = RangeSpec::parse("~:10").unwrap();
    for value in PROBES {
        assert_eq!(upper.check(value), value < 10.0, "10: at {}", value);
        assert_eq!(lower.check(value), value > 10.0, "~:10 at {}", value);
    }
}

#[test]
fn test_inverted_is_exact_negation() {
    for body in ["10", "10:", "~:30", "5:33", "32:32"] {
        let plain = RangeSpec::parse(body).unwrap();
        let inverted = RangeSpec::parse(&format!("@{}", body)).unwrap();
        assert_eq!(plain.start, inverted.start);
        assert_eq!(plain.end, inverted.end);
        for value in PROBES {
            assert_eq!(plain.check(value), !inverted.check(value));
        }
    }
}

#[test]
fn test_parsing_is_idempotent() {
    for spec in ["10", "10:", "~:30", "5:33", "@32:64", "@32"] {
        let first = RangeSpec::parse(spec).unwrap();
        let second = RangeSpec::parse(spec).unwrap();
        assert_eq!(first, second);
        for value in PROBES {
            assert_eq!(first.check(value), second.check(value));
        }
    }
}

#[test]
fn test_parse_failure_is_never_a_zero_range() {
    for spec in ["", "garbage", "1 0", "10:~", "~", "@"] {
        assert!(RangeSpec::parse(spec).is_err(), "'{}' should not parse", spec);
    }
}

#[test]
fn test_non_numeric_measurement_is_an_error() {
    let r = RangeSpec::parse("10").unwrap();
    assert!(matches!(
        r.check_str("twelve"),
        Err(CheckError::InvalidMeasurement(_))
    ));
    assert!(r.check_str("12").unwrap());
}
